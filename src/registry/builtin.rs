//! Install strategies for well-known dependencies whose metadata names none.

use crate::core::Platform;
use crate::installer::strategy::{AssetCopy, CMakeBuild, CopyRule, InstallStrategy, PlatformBranch, SourceSpec};

const SDL_DEVEL_VC_URL: &str = "https://www.libsdl.org/release/SDL2-devel-{version}-VC.zip";
const SDL_SOURCE_URL: &str = "https://www.libsdl.org/release/SDL2-{version}.tar.gz";
const SDL_ROOT: &str = "SDL2-{version}";

/// The built-in strategy for `key`, if it has one.
#[must_use]
pub fn strategy_for(key: &str) -> Option<InstallStrategy> {
    match key {
        "cxxopts" => Some(InstallStrategy::AssetCopy(AssetCopy {
            source: SourceSpec::Tag { tag: None },
            copy: vec![CopyRule::File {
                from: "include/cxxopts.hpp".into(),
                to: "include".into(),
            }],
        })),
        "stb_image" => Some(InstallStrategy::AssetCopy(AssetCopy {
            source: SourceSpec::Commit,
            copy: vec![CopyRule::File {
                from: "stb_image.h".into(),
                to: "include".into(),
            }],
        })),
        "sdl" => Some(InstallStrategy::PlatformBranch(PlatformBranch {
            platform: Platform::Windows,
            prebuilt: AssetCopy {
                source: SourceSpec::Url {
                    url: SDL_DEVEL_VC_URL.into(),
                    root: Some(SDL_ROOT.into()),
                },
                copy: vec![
                    CopyRule::Directory {
                        from: "include".into(),
                        to: "include/SDL2".into(),
                    },
                    CopyRule::Contents {
                        from: "lib/{msvc_arch}".into(),
                        to: "lib".into(),
                        replace: Some("SDL".into()),
                    },
                ],
            },
            otherwise: CMakeBuild {
                source: SourceSpec::Url {
                    url: SDL_SOURCE_URL.into(),
                    root: Some(SDL_ROOT.into()),
                },
            },
        })),
        _ => None,
    }
}

/// The strategy used for `key` when the metadata does not name one.
#[must_use]
pub fn default_strategy(key: &str) -> InstallStrategy {
    strategy_for(key).unwrap_or_else(|| InstallStrategy::CMakeBuild(CMakeBuild::default()))
}
