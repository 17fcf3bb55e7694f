//! Source builds driven by CMake.

use anyhow::Result;
use std::path::Path;

use super::context::InstallContext;
use super::strategy::CMakeBuild;
use crate::fetch::Fetch;
use crate::invocation::{CMakeGenerator, Invocation};
use crate::registry::Dependency;
use crate::shell::ToolCommand;

impl CMakeBuild {
    /// Fetches the sources, then configures, builds and installs them into the
    /// prefix. Any failing step aborts the install.
    pub async fn install<F: Fetch>(&self, dependency: &Dependency, context: &InstallContext<'_, F>) -> Result<()> {
        let scratch = context.scratch(dependency)?;
        let source = context.acquire(dependency, &self.source, scratch.path()).await?;
        let build = scratch.path().join("build");

        for command in cmake_commands(
            dependency,
            context.invocation,
            &source,
            &build,
            context.prefix(),
            context.shell.is_dry_run(),
        )? {
            context
                .shell
                .run(command.inherit_stdio().with_context(dependency.key.clone()))
                .await?;
        }
        Ok(())
    }
}

/// The `cmake` configure command. With `dry_run` set, tools that were not found
/// appear under their bare names.
pub fn configure_command(
    dependency: &Dependency,
    invocation: &Invocation,
    source: &Path,
    build: &Path,
    prefix: &Path,
    dry_run: bool,
) -> Result<ToolCommand> {
    let toolchain = &invocation.toolchain;
    let mut command = ToolCommand::new(toolchain.cmake(dry_run)?)
        .arg("-S")
        .path_arg(source)
        .arg("-B")
        .path_arg(build)
        .args(["-G", invocation.generator.cmake_name()])
        .arg(format!("-DCMAKE_BUILD_TYPE={}", invocation.build_variant.cmake_name()))
        .arg(format!("-DCMAKE_INSTALL_PREFIX={}", prefix.display()));

    if invocation.generator == CMakeGenerator::Ninja {
        command = command.arg(format!("-DCMAKE_MAKE_PROGRAM={}", toolchain.ninja(dry_run)?.display()));
    }
    if let Some(cc) = &toolchain.cc {
        command = command.arg(format!("-DCMAKE_C_COMPILER={}", cc.display()));
    }
    if let Some(cxx) = &toolchain.cxx {
        command = command.arg(format!("-DCMAKE_CXX_COMPILER={}", cxx.display()));
    }
    for (name, value) in &dependency.cmake_options {
        command = command.arg(format!("-D{name}={value}"));
    }
    Ok(command)
}

/// Build and install commands of the generator's driver.
pub fn build_and_install_commands(invocation: &Invocation, build: &Path, dry_run: bool) -> Result<[ToolCommand; 2]> {
    let toolchain = &invocation.toolchain;
    let jobs = invocation.jobs.map(|jobs| jobs.to_string());

    let commands = match invocation.generator {
        CMakeGenerator::Ninja | CMakeGenerator::Make => {
            let driver = match invocation.generator {
                CMakeGenerator::Ninja => toolchain.ninja(dry_run)?,
                _ => toolchain.make(dry_run)?,
            };
            let mut build_step = ToolCommand::new(driver).arg("-C").path_arg(build);
            if let Some(jobs) = &jobs {
                build_step = build_step.args(["-j", jobs.as_str()]);
            }
            let install_step = ToolCommand::new(driver).arg("-C").path_arg(build).arg("install");
            [build_step, install_step]
        }
        CMakeGenerator::VisualStudio => {
            let cmake = toolchain.cmake(dry_run)?;
            let config = invocation.build_variant.cmake_name();
            let mut build_step = ToolCommand::new(cmake)
                .arg("--build")
                .path_arg(build)
                .args(["--config", config]);
            if let Some(jobs) = &jobs {
                build_step = build_step.args(["--parallel", jobs.as_str()]);
            }
            let install_step = ToolCommand::new(cmake)
                .arg("--install")
                .path_arg(build)
                .args(["--config", config]);
            [build_step, install_step]
        }
    };
    Ok(commands)
}

/// Configure, build and install commands, in order.
pub fn cmake_commands(
    dependency: &Dependency,
    invocation: &Invocation,
    source: &Path,
    build: &Path,
    prefix: &Path,
    dry_run: bool,
) -> Result<Vec<ToolCommand>> {
    let configure = configure_command(dependency, invocation, source, build, prefix, dry_run)?;
    let [build_step, install_step] = build_and_install_commands(invocation, build, dry_run)?;
    Ok(vec![configure, build_step, install_step])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Platform, Target};
    use crate::invocation::BuildVariant;
    use crate::registry::OptionValue;
    use std::path::PathBuf;

    fn invocation(generator: CMakeGenerator) -> Invocation {
        let mut invocation = Invocation::new("/src", Target::new(Platform::Linux, "x86_64"));
        invocation.generator = generator;
        invocation.toolchain.cmake = Some(PathBuf::from("cmake"));
        invocation.toolchain.ninja = Some(PathBuf::from("/usr/bin/ninja"));
        invocation.toolchain.make = Some(PathBuf::from("make"));
        invocation
    }

    #[test]
    fn test_ninja_configure_line() {
        let mut dep = Dependency::new("sdl", "2.0.10");
        dep.cmake_options.insert("SDL_SHARED".into(), OptionValue::Bool(false));
        dep.cmake_options.insert("SDL_STATIC".into(), OptionValue::Bool(true));
        let mut invocation = invocation(CMakeGenerator::Ninja);
        invocation.build_variant = BuildVariant::Debug;

        let command = configure_command(
            &dep,
            &invocation,
            Path::new("/b/tmp/sdl/src/SDL2-2.0.10"),
            Path::new("/b/tmp/sdl/build"),
            Path::new("/b/linux-x86_64/dependencies"),
            false,
        )
        .unwrap();

        assert_eq!(
            command.display(),
            "cmake -S /b/tmp/sdl/src/SDL2-2.0.10 -B /b/tmp/sdl/build -G Ninja -DCMAKE_BUILD_TYPE=Debug \
             -DCMAKE_INSTALL_PREFIX=/b/linux-x86_64/dependencies -DCMAKE_MAKE_PROGRAM=/usr/bin/ninja \
             -DSDL_SHARED=OFF -DSDL_STATIC=ON"
        );
    }

    #[test]
    fn test_make_has_no_make_program_and_passes_jobs() {
        let mut invocation = invocation(CMakeGenerator::Make);
        invocation.jobs = Some(8);
        let commands = cmake_commands(
            &Dependency::new("glm", "0.9.9"),
            &invocation,
            Path::new("/s"),
            Path::new("/b"),
            Path::new("/p"),
            false,
        )
        .unwrap();

        assert!(!commands[0].display().contains("CMAKE_MAKE_PROGRAM"));
        assert!(commands[0].display().contains("-G 'Unix Makefiles'"));
        assert_eq!(commands[1].display(), "make -C /b -j 8");
        assert_eq!(commands[2].display(), "make -C /b install");
    }

    #[test]
    fn test_visual_studio_uses_cmake_driver() {
        let invocation = invocation(CMakeGenerator::VisualStudio);
        let [build_step, install_step] = build_and_install_commands(&invocation, Path::new("/b"), false).unwrap();
        assert_eq!(build_step.display(), "cmake --build /b --config Release");
        assert_eq!(install_step.display(), "cmake --install /b --config Release");
    }

    #[test]
    fn test_compilers_passed_when_detected() {
        let mut invocation = invocation(CMakeGenerator::Make);
        invocation.toolchain.cc = Some(PathBuf::from("/usr/bin/clang"));
        invocation.toolchain.cxx = Some(PathBuf::from("/usr/bin/clang++"));
        let line = configure_command(&Dependency::new("x", "1"), &invocation, Path::new("/s"), Path::new("/b"), Path::new("/p"), false)
            .unwrap()
            .display();
        assert!(line.contains("-DCMAKE_C_COMPILER=/usr/bin/clang "));
        assert!(line.ends_with("-DCMAKE_CXX_COMPILER=/usr/bin/clang++"));
    }

    #[test]
    fn test_missing_cmake() {
        let mut invocation = invocation(CMakeGenerator::Ninja);
        invocation.toolchain.cmake = None;
        let dep = Dependency::new("x", "1");
        assert!(configure_command(&dep, &invocation, Path::new("/s"), Path::new("/b"), Path::new("/p"), false).is_err());
    }

    #[test]
    fn test_dry_run_keeps_detected_generator() {
        let mut invocation = Invocation::new("/src", Target::new(Platform::Linux, "x86_64"));
        invocation.generator = CMakeGenerator::default_for(Platform::Linux, &invocation.toolchain);
        assert_eq!(invocation.generator, CMakeGenerator::Make);

        let commands = cmake_commands(
            &Dependency::new("glm", "0.9.9"),
            &invocation,
            Path::new("/s"),
            Path::new("/b"),
            Path::new("/p"),
            true,
        )
        .unwrap();
        assert!(commands[0].display().starts_with("cmake -S /s -B /b -G 'Unix Makefiles'"));
        assert!(!commands[0].display().contains("CMAKE_MAKE_PROGRAM"));
        assert_eq!(commands[1].display(), "make -C /b");
        assert_eq!(commands[2].display(), "make -C /b install");
    }
}
