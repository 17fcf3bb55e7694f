//! End-to-end installs through the real installer with fixture sources.

use anyhow::Result;
use std::fs;

use depwright::core::{DepwrightError, ErrorKind, Platform};
use depwright::installer::{InstallContext, Selection, install_selected};
use depwright::ledger::InstalledVersions;
use depwright::resolver::{InstallOutcome, InstallReason};
use depwright::shell::{Shell, quote_command};
use depwright::test_utils::MockFetcher;
use depwright::utils::sha256_file;

use crate::common::{Sandbox, registry, write_tar_gz, write_zip};

const CXXOPTS: &str = r#"{
    "version": "0.1.0",
    "dependencies": {
        "cxxopts": {
            "name": "cxxopts",
            "version": "2.2.0",
            "repository": "jarro2783/cxxopts",
            "library_files": "include/cxxopts.hpp"
        }
    }
}"#;

#[tokio::test]
async fn test_cxxopts_fresh_install_replaces_stale_header() -> Result<()> {
    let sandbox = Sandbox::new(Platform::Linux)?;
    let fixture = sandbox.path().join("fixtures/cxxopts");
    sandbox.write("fixtures/cxxopts/include/cxxopts.hpp", "// 2.2.0")?;
    sandbox.install_file("include/cxxopts.hpp", "// 2.1.0")?;

    let registry = registry(CXXOPTS)?;
    let shell = Shell::new(false, false);
    let fetcher = MockFetcher::new().with_tag("jarro2783/cxxopts", "v2.2.0", &fixture);
    let mut ledger = InstalledVersions::load(&sandbox.build_dir.ledger);

    let context = InstallContext::new(&sandbox.invocation, &sandbox.build_dir, &shell, &fetcher);
    let outcomes = install_selected(&registry, &Selection::default(), context, &mut ledger).await?;

    assert_eq!(outcomes, vec![("cxxopts".to_string(), InstallOutcome::Installed(InstallReason::NotInstalled))]);
    assert_eq!(fetcher.calls(), vec!["tag jarro2783/cxxopts@v2.2.0"]);
    assert_eq!(fs::read_to_string(sandbox.prefix().join("include/cxxopts.hpp"))?, "// 2.2.0");
    assert_eq!(sandbox.ledger_json(), Some(serde_json::json!({ "cxxopts": "2.2.0" })));
    assert!(!sandbox.build_dir.scratch_for("cxxopts").exists());
    Ok(())
}

#[tokio::test]
async fn test_sdl_up_to_date_is_not_fetched() -> Result<()> {
    let sandbox = Sandbox::new(Platform::Linux)?;
    let registry = registry(
        r#"{"dependencies": {"sdl": {
            "name": "SDL",
            "version": "2.0.10",
            "library_files": { "windows": "lib/SDL2.lib", "linux": "lib/libSDL2.a" }
        }}}"#,
    )?;
    sandbox.install_file("lib/libSDL2.a", "archive")?;
    sandbox.write("build/linux-x86_64/versions.json", r#"{"sdl": "2.0.10"}"#)?;

    let shell = Shell::new(false, false);
    let fetcher = MockFetcher::offline();
    let mut ledger = InstalledVersions::load(&sandbox.build_dir.ledger);

    let context = InstallContext::new(&sandbox.invocation, &sandbox.build_dir, &shell, &fetcher);
    let outcomes = install_selected(&registry, &Selection::default(), context, &mut ledger).await?;

    assert_eq!(outcomes, vec![("sdl".to_string(), InstallOutcome::UpToDate)]);
    assert!(fetcher.calls().is_empty());
    assert!(shell.trace().is_empty());
    Ok(())
}

#[tokio::test]
async fn test_fetch_failure_leaves_ledger_and_removes_scratch() -> Result<()> {
    let sandbox = Sandbox::new(Platform::Linux)?;
    let registry = registry(
        r#"{"dependencies": {"glm": {"name": "GLM", "version": "0.9.9.8", "repository": "g-truc/glm"}}}"#,
    )?;
    let shell = Shell::new(false, false);
    let fetcher = MockFetcher::offline();
    let mut ledger = InstalledVersions::load(&sandbox.build_dir.ledger);

    let context = InstallContext::new(&sandbox.invocation, &sandbox.build_dir, &shell, &fetcher);
    let err = install_selected(&registry, &Selection::default(), context, &mut ledger)
        .await
        .unwrap_err();

    let error = err.downcast_ref::<DepwrightError>().expect("typed error");
    assert_eq!(error.kind(), ErrorKind::Network);
    assert!(err.to_string().contains("Failed to install 'glm'"));
    assert!(ledger.is_empty());
    assert!(!sandbox.build_dir.ledger.exists());
    assert!(!sandbox.build_dir.scratch_for("glm").exists());
    Ok(())
}

#[tokio::test]
async fn test_dry_run_cmake_build_touches_nothing() -> Result<()> {
    let sandbox = Sandbox::new(Platform::Linux)?;
    let registry = registry(
        r#"{"dependencies": {"glm": {
            "name": "GLM",
            "version": "0.9.9.8",
            "repository": "g-truc/glm",
            "cmake_options": { "GLM_TEST_ENABLE": false }
        }}}"#,
    )?;
    let shell = Shell::new(true, false);
    let fetcher = MockFetcher::new();
    let mut ledger = InstalledVersions::load(&sandbox.build_dir.ledger);

    let context = InstallContext::new(&sandbox.invocation, &sandbox.build_dir, &shell, &fetcher);
    let outcomes = install_selected(&registry, &Selection::default(), context, &mut ledger).await?;

    assert_eq!(outcomes, vec![("glm".to_string(), InstallOutcome::Installed(InstallReason::NotInstalled))]);
    assert!(fetcher.calls().is_empty());
    assert!(!sandbox.path().join("build").exists());

    let scratch = sandbox.build_dir.scratch_for("glm");
    let source = scratch.join("glm").display().to_string();
    let build = scratch.join("build").display().to_string();
    let prefix = format!("-DCMAKE_INSTALL_PREFIX={}", sandbox.prefix().display());
    let configure = quote_command(&[
        "cmake",
        "-S",
        source.as_str(),
        "-B",
        build.as_str(),
        "-G",
        "Ninja",
        "-DCMAKE_BUILD_TYPE=Release",
        prefix.as_str(),
        "-DCMAKE_MAKE_PROGRAM=ninja",
        "-DGLM_TEST_ENABLE=OFF",
    ]);

    let tarball = scratch.join("glm-v0.9.9.8.tar.gz").display().to_string();
    let download = quote_command(&[
        "curl",
        "-fL",
        "-o",
        tarball.as_str(),
        "https://api.github.com/repos/g-truc/glm/tarball/refs/tags/v0.9.9.8",
    ]);

    let trace = shell.trace();
    assert!(trace.contains(&download), "{trace:#?}");
    assert!(trace.contains(&configure), "{trace:#?}");
    assert!(trace.contains(&quote_command(&["ninja", "-C", build.as_str(), "install"])));
    assert_eq!(trace.last(), Some(&quote_command(&["rm", "-rf", &scratch.display().to_string()])));
    Ok(())
}

#[tokio::test]
async fn test_url_archive_with_checksum_and_prerequisites() -> Result<()> {
    let sandbox = Sandbox::new(Platform::Linux)?;
    let zlib = write_tar_gz(
        &sandbox.path().join("fixtures/zlib-1.2.11.tar.gz"),
        &[("zlib-1.2.11/include/zlib.h", "zlib"), ("zlib-1.2.11/README", "readme")],
    )?;
    let png = write_tar_gz(
        &sandbox.path().join("fixtures/png-1.6.37.tar.gz"),
        &[("png-1.6.37/include/png.h", "png")],
    )?;
    let checksum = sha256_file(&zlib)?;

    let copy_headers = r#"{
        "strategy": "asset_copy",
        "source": { "from": "url", "url": "https://example.com/{key}-{version}.tar.gz", "root": "{key}-{version}" },
        "copy": [ { "kind": "directory", "from": "include", "to": "include/{key}" } ]
    }"#;
    let registry = registry(&format!(
        r#"{{"dependencies": {{
            "png": {{ "name": "libpng", "version": "1.6.37", "requires": ["zlib"],
                      "files": "include/png/png.h", "install": {copy_headers} }},
            "zlib": {{ "name": "zlib", "version": "1.2.11", "sha256": "{}",
                       "files": "include/zlib/zlib.h", "install": {copy_headers} }}
        }}}}"#,
        checksum.to_uppercase()
    ))?;

    let shell = Shell::new(false, false);
    let fetcher = MockFetcher::new()
        .with_url("https://example.com/zlib-1.2.11.tar.gz", &zlib)
        .with_url("https://example.com/png-1.6.37.tar.gz", &png);
    let mut ledger = InstalledVersions::load(&sandbox.build_dir.ledger);
    let selection = Selection {
        only: vec!["png".to_string()],
        ..Selection::default()
    };

    let context = InstallContext::new(&sandbox.invocation, &sandbox.build_dir, &shell, &fetcher);
    let outcomes = install_selected(&registry, &selection, context, &mut ledger).await?;

    let order: Vec<&str> = outcomes.iter().map(|(key, _)| key.as_str()).collect();
    assert_eq!(order, vec!["zlib", "png"]);
    assert_eq!(
        fetcher.calls(),
        vec!["url https://example.com/zlib-1.2.11.tar.gz", "url https://example.com/png-1.6.37.tar.gz"]
    );
    assert_eq!(fs::read_to_string(sandbox.prefix().join("include/zlib/zlib.h"))?, "zlib");
    assert!(sandbox.prefix().join("include/png/png.h").is_file());
    assert_eq!(
        sandbox.ledger_json(),
        Some(serde_json::json!({ "png": "1.6.37", "zlib": "1.2.11" }))
    );
    Ok(())
}

#[tokio::test]
async fn test_checksum_mismatch_is_a_network_error() -> Result<()> {
    let sandbox = Sandbox::new(Platform::Linux)?;
    let archive = write_tar_gz(&sandbox.path().join("fixtures/lua.tar.gz"), &[("lua-5.3.5/lua.h", "lua")])?;
    let registry = registry(&format!(
        r#"{{"dependencies": {{"lua": {{
            "name": "Lua", "version": "5.3.5", "sha256": "{}",
            "install": {{ "strategy": "asset_copy",
                          "source": {{ "from": "url", "url": "https://www.lua.org/ftp/lua-{{version}}.tar.gz" }},
                          "copy": [ {{ "kind": "file", "from": "lua.h", "to": "include" }} ] }}
        }}}}}}"#,
        "0".repeat(64)
    ))?;

    let shell = Shell::new(false, false);
    let fetcher = MockFetcher::new().with_url("https://www.lua.org/ftp/lua-5.3.5.tar.gz", &archive);
    let mut ledger = InstalledVersions::load(&sandbox.build_dir.ledger);

    let context = InstallContext::new(&sandbox.invocation, &sandbox.build_dir, &shell, &fetcher);
    let err = install_selected(&registry, &Selection::default(), context, &mut ledger)
        .await
        .unwrap_err();

    assert!(matches!(
        err.downcast_ref::<DepwrightError>(),
        Some(DepwrightError::ChecksumMismatch { .. })
    ));
    assert!(!sandbox.prefix().join("include/lua.h").exists());
    assert!(ledger.get("lua").is_none());
    Ok(())
}

#[tokio::test]
async fn test_missing_library_files_fail_verification() -> Result<()> {
    let sandbox = Sandbox::new(Platform::Linux)?;
    let fixture = sandbox.path().join("fixtures/stb");
    sandbox.write("fixtures/stb/stb_image.h", "stb")?;
    let registry = registry(
        r#"{"dependencies": {"stb_image": {
            "name": "stb_image",
            "version": "2.23",
            "commit": "f67165c2bb2af3060ecae7d20d6f731173485ad0",
            "repository": "nothings/stb",
            "library_files": "include/stb/stb_image.h"
        }}}"#,
    )?;

    let shell = Shell::new(false, false);
    let fetcher = MockFetcher::new().with_commit(
        "nothings/stb",
        "f67165c2bb2af3060ecae7d20d6f731173485ad0",
        &fixture,
    );
    let mut ledger = InstalledVersions::load(&sandbox.build_dir.ledger);

    let context = InstallContext::new(&sandbox.invocation, &sandbox.build_dir, &shell, &fetcher);
    let err = install_selected(&registry, &Selection::default(), context, &mut ledger)
        .await
        .unwrap_err();

    assert!(sandbox.prefix().join("include/stb_image.h").is_file());
    assert!(matches!(
        err.downcast_ref::<DepwrightError>(),
        Some(DepwrightError::InstallVerificationFailed { dependency }) if dependency == "stb_image"
    ));
    assert!(!sandbox.build_dir.ledger.exists());
    Ok(())
}

#[tokio::test]
async fn test_test_only_dependencies_need_the_flag() -> Result<()> {
    let sandbox = Sandbox::new(Platform::Linux)?;
    sandbox.write("fixtures/gtest/include/gtest/gtest.h", "gtest")?;
    let registry = registry(
        r#"{"dependencies": {"googletest": {
            "name": "Google Test",
            "version": "1.10.0",
            "test_only": true,
            "repository": "google/googletest",
            "install": { "strategy": "asset_copy",
                         "source": { "from": "tag", "tag": "release-{version}" },
                         "copy": [ { "kind": "contents", "from": "include", "to": "include" } ] }
        }}}"#,
    )?;
    let shell = Shell::new(false, false);
    let fetcher = MockFetcher::new().with_tag(
        "google/googletest",
        "release-1.10.0",
        sandbox.path().join("fixtures/gtest"),
    );
    let mut ledger = InstalledVersions::load(&sandbox.build_dir.ledger);

    let context = InstallContext::new(&sandbox.invocation, &sandbox.build_dir, &shell, &fetcher);
    let outcomes = install_selected(&registry, &Selection::default(), context, &mut ledger).await?;
    assert!(outcomes.is_empty());
    assert!(fetcher.calls().is_empty());

    let selection = Selection {
        build_tests: true,
        ..Selection::default()
    };
    let context = InstallContext::new(&sandbox.invocation, &sandbox.build_dir, &shell, &fetcher);
    let outcomes = install_selected(&registry, &selection, context, &mut ledger).await?;
    assert_eq!(outcomes.len(), 1);
    assert!(sandbox.prefix().join("include/gtest/gtest.h").is_file());
    Ok(())
}

#[tokio::test]
async fn test_sdl_windows_prebuilt_from_devel_zip() -> Result<()> {
    let sandbox = Sandbox::new(Platform::Windows)?;
    let archive = write_zip(
        &sandbox.path().join("fixtures/SDL2-devel-2.0.10-VC.zip"),
        &[
            ("SDL2-2.0.10/include/SDL.h", "sdl"),
            ("SDL2-2.0.10/lib/x64/SDL2.lib", "import library"),
            ("SDL2-2.0.10/lib/x64/SDL2.dll", "dll"),
            ("SDL2-2.0.10/lib/x86/SDL2.lib", "32-bit"),
        ],
    )?;
    sandbox.install_file("lib/SDL2-old.dll", "stale")?;
    sandbox.install_file("lib/zlib.lib", "unrelated")?;
    let registry = registry(
        r#"{"dependencies": {"sdl": {
            "name": "SDL",
            "version": "2.0.10",
            "library_files": { "windows": "lib/SDL2.lib", "linux": "lib/libSDL2.a" }
        }}}"#,
    )?;

    let shell = Shell::new(false, false);
    let fetcher =
        MockFetcher::new().with_url("https://www.libsdl.org/release/SDL2-devel-2.0.10-VC.zip", &archive);
    let mut ledger = InstalledVersions::load(&sandbox.build_dir.ledger);

    let context = InstallContext::new(&sandbox.invocation, &sandbox.build_dir, &shell, &fetcher);
    let outcomes = install_selected(&registry, &Selection::default(), context, &mut ledger).await?;

    assert_eq!(outcomes, vec![("sdl".to_string(), InstallOutcome::Installed(InstallReason::NotInstalled))]);
    assert_eq!(fetcher.calls(), vec!["url https://www.libsdl.org/release/SDL2-devel-2.0.10-VC.zip"]);
    assert_eq!(fs::read_to_string(sandbox.prefix().join("include/SDL2/SDL.h"))?, "sdl");
    assert_eq!(fs::read_to_string(sandbox.prefix().join("lib/SDL2.lib"))?, "import library");
    assert!(sandbox.prefix().join("lib/SDL2.dll").is_file());
    assert!(!sandbox.prefix().join("lib/SDL2-old.dll").exists());
    assert!(sandbox.prefix().join("lib/zlib.lib").is_file());
    assert!(!sandbox.prefix().join("lib/x86").exists());
    assert_eq!(sandbox.ledger_json(), Some(serde_json::json!({ "sdl": "2.0.10" })));
    assert!(!sandbox.build_dir.scratch_for("sdl").exists());
    Ok(())
}

const RELEASE_ASSET: &str = r#"{"dependencies": {"vulkan_headers": {
    "name": "Vulkan Headers",
    "version": "1.2.131",
    "repository": "example/vulkan-headers",
    "asset_name": "vulkan-headers-{version}.tar.gz",
    "library_files": "include/vulkan/vulkan.h",
    "install": { "strategy": "asset_copy",
                 "source": { "from": "release", "root": "vulkan-headers-{version}" },
                 "copy": [ { "kind": "directory", "from": "include/vulkan", "to": "include/vulkan" } ] }
}}}"#;

#[tokio::test]
async fn test_release_asset_is_downloaded_and_copied() -> Result<()> {
    let sandbox = Sandbox::new(Platform::Linux)?;
    let archive = write_tar_gz(
        &sandbox.path().join("fixtures/vulkan-headers-1.2.131.tar.gz"),
        &[("vulkan-headers-1.2.131/include/vulkan/vulkan.h", "vulkan")],
    )?;
    let registry = registry(RELEASE_ASSET)?;

    let shell = Shell::new(false, false);
    let fetcher = MockFetcher::new().with_asset(
        "example/vulkan-headers",
        "v1.2.131",
        "vulkan-headers-1.2.131.tar.gz",
        &archive,
    );
    let mut ledger = InstalledVersions::load(&sandbox.build_dir.ledger);

    let context = InstallContext::new(&sandbox.invocation, &sandbox.build_dir, &shell, &fetcher);
    install_selected(&registry, &Selection::default(), context, &mut ledger).await?;

    assert_eq!(
        fetcher.calls(),
        vec!["asset example/vulkan-headers@v1.2.131/vulkan-headers-1.2.131.tar.gz"]
    );
    assert_eq!(fs::read_to_string(sandbox.prefix().join("include/vulkan/vulkan.h"))?, "vulkan");
    assert_eq!(sandbox.ledger_json(), Some(serde_json::json!({ "vulkan_headers": "1.2.131" })));
    Ok(())
}

#[tokio::test]
async fn test_missing_release_asset_fails_without_ledger_entry() -> Result<()> {
    let sandbox = Sandbox::new(Platform::Linux)?;
    let registry = registry(RELEASE_ASSET)?;

    let shell = Shell::new(false, false);
    let fetcher = MockFetcher::new();
    let mut ledger = InstalledVersions::load(&sandbox.build_dir.ledger);

    let context = InstallContext::new(&sandbox.invocation, &sandbox.build_dir, &shell, &fetcher);
    let err = install_selected(&registry, &Selection::default(), context, &mut ledger)
        .await
        .unwrap_err();

    match err.downcast_ref::<DepwrightError>() {
        Some(error @ DepwrightError::AssetNotFound { repository, tag, asset }) => {
            assert_eq!(repository, "example/vulkan-headers");
            assert_eq!(tag, "v1.2.131");
            assert_eq!(asset, "vulkan-headers-1.2.131.tar.gz");
            assert_eq!(error.kind(), ErrorKind::Network);
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert!(ledger.is_empty());
    assert!(!sandbox.build_dir.ledger.exists());
    assert!(!sandbox.build_dir.scratch_for("vulkan_headers").exists());
    Ok(())
}
