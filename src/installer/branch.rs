//! Per-platform choice between a prebuilt copy and a source build.

use anyhow::Result;
use tracing::debug;

use super::context::InstallContext;
use super::strategy::PlatformBranch;
use crate::core::Platform;
use crate::fetch::Fetch;
use crate::registry::Dependency;

impl PlatformBranch {
    /// Whether the prebuilt branch applies on `platform`.
    #[must_use]
    pub fn uses_prebuilt(&self, platform: Platform) -> bool {
        self.platform == platform
    }

    /// Runs the prebuilt copy on the branch platform, the source build elsewhere.
    pub async fn install<F: Fetch>(&self, dependency: &Dependency, context: &InstallContext<'_, F>) -> Result<()> {
        let platform = context.invocation.platform();
        if self.uses_prebuilt(platform) {
            debug!("Using prebuilt '{}' on {}", dependency.key, platform);
            self.prebuilt.install(dependency, context).await
        } else {
            debug!("Building '{}' from source on {}", dependency.key, platform);
            self.otherwise.install(dependency, context).await
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::installer::strategy::InstallStrategy;
    use crate::registry::builtin;

    #[test]
    fn test_sdl_branch_selection() {
        let Some(InstallStrategy::PlatformBranch(branch)) = builtin::strategy_for("sdl") else {
            panic!("sdl has a platform branch");
        };
        assert!(branch.uses_prebuilt(Platform::Windows));
        assert!(!branch.uses_prebuilt(Platform::Linux));
        assert!(!branch.uses_prebuilt(Platform::Darwin));
    }
}
