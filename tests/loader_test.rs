// tests/loader_test.rs
use std::fs;
use std::path::{Path, PathBuf};
use sif_rs::modules::builtin::register_builtin;
use sif_rs::modules::{Loader, ModuleRegistry, ModuleType};

fn write_module(dir: &Path, file: &str, id: &str, name: &str) {
    let yaml = format!(
        r#"id: {id}
info:
  name: {name}
  tags: [recon]
type: http
http:
  paths: ["{{{{BaseURL}}}}/{id}"]
  matchers:
    - type: status
      status: [200]
"#
    );
    fs::write(dir.join(file), yaml).unwrap();
}

#[test]
fn test_user_module_overrides_builtin() {
    let builtin = tempfile::tempdir().unwrap();
    let user = tempfile::tempdir().unwrap();
    write_module(builtin.path(), "git.yaml", "git-config", "Builtin Git");
    write_module(builtin.path(), "env.yaml", "env-file", "Builtin Env");
    write_module(user.path(), "git.yml", "git-config", "User Git");

    let registry = ModuleRegistry::new();
    let mut loader = Loader::with_dirs(builtin.path(), Some(user.path().to_path_buf()));
    loader.load_all_into(&registry);

    assert_eq!(loader.loaded(), 3);
    assert_eq!(registry.count(), 2);
    assert_eq!(registry.get("git-config").unwrap().info().name, "User Git");
    assert_eq!(registry.get("env-file").unwrap().info().name, "Builtin Env");
}

#[test]
fn test_broken_files_are_skipped() {
    let dir = tempfile::tempdir().unwrap();
    write_module(dir.path(), "good.yaml", "good", "Good");
    fs::write(dir.path().join("no-id.yaml"), "type: http\nhttp:\n  paths: [/]\n").unwrap();
    fs::write(dir.path().join("garbage.yaml"), ":\n  - [unbalanced").unwrap();
    fs::write(dir.path().join("no-block.yaml"), "id: x\ntype: tcp\n").unwrap();
    fs::write(dir.path().join("notes.txt"), "not a module").unwrap();

    let registry = ModuleRegistry::new();
    let mut loader = Loader::with_dirs(dir.path(), None);
    loader.load_all_into(&registry);

    assert_eq!(loader.loaded(), 1);
    assert_eq!(registry.count(), 1);
    assert!(registry.get("good").is_some());
}

#[test]
fn test_missing_user_dir_is_fine() {
    let dir = tempfile::tempdir().unwrap();
    write_module(dir.path(), "a.yaml", "a", "A");

    let registry = ModuleRegistry::new();
    let mut loader = Loader::with_dirs(dir.path(), Some(PathBuf::from("/nonexistent/sif/modules")));
    assert_eq!(loader.load_all_into(&registry), 1);
    assert_eq!(loader.user_dir(), Some(Path::new("/nonexistent/sif/modules")));
    assert_eq!(loader.builtin_dir(), dir.path());
}

#[test]
fn test_shipped_modules_parse() {
    let shipped = Path::new(env!("CARGO_MANIFEST_DIR")).join("modules");
    let registry = ModuleRegistry::new();
    let mut loader = Loader::with_dirs(&shipped, None);
    loader.load_all_into(&registry);

    assert_eq!(loader.loaded(), fs::read_dir(&shipped).unwrap().count());
    assert_eq!(registry.by_type(ModuleType::Tcp).len(), 1);
    assert_eq!(registry.by_type(ModuleType::Dns).len(), 1);
    assert!(registry.get("git-config").is_some());
}

#[test]
fn test_builtin_and_declarative_modules_share_registry() {
    let dir = tempfile::tempdir().unwrap();
    write_module(dir.path(), "a.yaml", "a", "A");

    let registry = ModuleRegistry::new();
    register_builtin(&registry);
    Loader::with_dirs(dir.path(), None).load_all_into(&registry);

    assert_eq!(registry.count(), 2);
    assert_eq!(registry.by_tag("recon").len(), 2);
    assert_eq!(registry.by_tag("cve").len(), 1);
}
