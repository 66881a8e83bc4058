mod common;

use anyhow::Result;
use common::{root, target};
use fsstate::config::Config;
use fsstate::{
    FORMAT_VERSION, FsState, FsStateContext, LoadOutcome, PermissiveCatalog, StateFile,
    TargetRegistry, Timestamps, commands,
};
use std::path::Path;
use tempfile::TempDir;

fn context(dir: &TempDir) -> Result<FsStateContext> {
    FsStateContext::new_explicit(
        dir.path().join("config.toml"),
        Some(dir.path().join("state/fs_state.bin")),
    )
}

#[test]
fn test_build_sessions_share_state_through_file() -> Result<()> {
    let dir = TempDir::new()?;
    let file = StateFile::new(dir.path().join("fs_state.bin"));
    let core = target("java-production", "core");
    let src = root(&core, "src");
    let timestamps = Timestamps::new();

    // First session: full scan, then a watcher reports two edits
    let first = FsState::new();
    assert_eq!(file.load(&first, &PermissiveCatalog)?, LoadOutcome::Missing);
    assert!(first.has_work_to_do(&core));
    first.mark_initial_scan_performed(&core);

    timestamps.set_stamp(Path::new("/p/src/A.java"), &core, 10);
    first.mark_dirty(Path::new("/p/src/A.java"), &src, Some(&timestamps), true);
    first.register_deleted(&core, Path::new("/p/src/B.java"), Some(&timestamps));
    assert_eq!(timestamps.get_stamp(Path::new("/p/src/A.java"), &core), None);
    file.save(&first)?;

    // Second session picks up where the first stopped
    let mut registry = TargetRegistry::new();
    registry.register_type("java-production");
    let second = FsState::new();
    let outcome = file.load(&second, &registry)?;
    assert!(matches!(outcome, LoadOutcome::Loaded(s) if s.loaded_targets == 1));
    assert!(second.has_work_to_do(&core));

    assert_eq!(second.get_and_clear_deleted_paths(&core).len(), 1);
    second.clear_recompile(&src);
    assert!(!second.has_work_to_do(&core));

    // Event stamps are session-local
    assert_eq!(
        second.get_event_registration_stamp(Path::new("/p/src/A.java")),
        None
    );
    Ok(())
}

#[test]
fn test_context_creates_default_config() -> Result<()> {
    let dir = TempDir::new()?;
    let ctx = context(&dir)?;

    assert!(ctx.config_path.exists());
    assert_eq!(ctx.state_path, dir.path().join("state/fs_state.bin"));

    let (state, outcome) = ctx.load_state()?;
    assert_eq!(outcome, LoadOutcome::Missing);
    assert!(state.scanned_targets().is_empty());
    Ok(())
}

#[test]
fn test_context_uses_configured_state_location() -> Result<()> {
    let dir = TempDir::new()?;
    let config_path = dir.path().join("config.toml");

    let mut config = Config::default();
    config.set("state.dir", dir.path().join("cache").display().to_string())?;
    config.set("state.file_name", "custom.bin".to_string())?;
    config.save(&config_path)?;

    let ctx = FsStateContext::new_explicit(config_path, None)?;
    assert_eq!(ctx.state_path, dir.path().join("cache/custom.bin"));
    Ok(())
}

#[test]
fn test_context_discards_corrupt_state() -> Result<()> {
    let dir = TempDir::new()?;
    let ctx = context(&dir)?;

    std::fs::create_dir_all(dir.path().join("state"))?;
    let mut bytes = FORMAT_VERSION.to_be_bytes().to_vec();
    bytes.extend_from_slice(&[0, 0, 0, 1, 0, 0]);
    std::fs::write(&ctx.state_path, bytes)?;

    let (state, outcome) = ctx.load_state()?;
    assert_eq!(outcome, LoadOutcome::Discarded);
    assert!(state.scanned_targets().is_empty());
    Ok(())
}

#[test]
fn test_context_reports_corrupt_state_when_reset_disabled() -> Result<()> {
    let dir = TempDir::new()?;
    let mut ctx = context(&dir)?;
    ctx.config.set("state.reset_on_corruption", "false".to_string())?;

    std::fs::create_dir_all(dir.path().join("state"))?;
    std::fs::write(&ctx.state_path, FORMAT_VERSION.to_be_bytes())?;

    assert!(ctx.load_state().is_err());
    Ok(())
}

#[test]
fn test_reset_command() -> Result<()> {
    let dir = TempDir::new()?;
    let ctx = context(&dir)?;

    assert!(commands::reset::execute(&ctx, false).is_err());
    commands::reset::execute(&ctx, true)?;

    let (state, outcome) = ctx.load_state()?;
    assert!(matches!(outcome, LoadOutcome::Loaded(s) if s.loaded_targets == 0));
    assert!(state.scanned_targets().is_empty());
    Ok(())
}
