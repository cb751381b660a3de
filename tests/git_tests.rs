//! Tests for remote layer fetching against local git repositories.
//!
//! These exercise the clone-if-absent / pull-if-present cache policy with
//! real git, using filesystem paths as clone URLs so no network is involved.

mod helpers;

use helpers::{commit_all, init_git_source, write_layer_file, TestEnv};
use stratify::cache::{self, LayerCache};
use stratify::inventory;
use stratify::recipe::LayerDescriptor;
use stratify::resolve::{self, fetch_remote};
use std::fs;

/// Cache entries for a URL, by directory name prefix.
fn cache_entries(env: &TestEnv, name: &str) -> Vec<String> {
    match fs::read_dir(&env.settings.cache_dir) {
        Ok(entries) => entries
            .filter_map(|e| e.ok())
            .filter(|e| e.path().is_dir())
            .map(|e| e.file_name().to_string_lossy().into_owned())
            .filter(|n| n.starts_with(name))
            .collect(),
        Err(_) => Vec::new(),
    }
}

#[test]
fn second_fetch_pulls_instead_of_recloning() {
    let env = TestEnv::new();
    let source = env.root().join("remote/net-layer");
    fs::create_dir_all(&source).unwrap();
    write_layer_file(&source, "package-lists/rpm-requirements.txt", "curl\n");
    init_git_source(&source);

    let url = source.to_string_lossy().into_owned();
    let cache = LayerCache::new(&env.settings.cache_dir);

    let first = fetch_remote(&cache, &url, None).unwrap();
    assert!(first.join("package-lists/rpm-requirements.txt").exists());
    assert_eq!(cache_entries(&env, "net-layer").len(), 1);

    // Grow the source, fetch again: same entry, refreshed contents.
    write_layer_file(&source, "package-lists/rpm-requirements.txt", "curl\nvim\n");
    commit_all(&source, "add vim");

    let second = fetch_remote(&cache, &url, None).unwrap();
    assert_eq!(first, second);
    assert_eq!(cache_entries(&env, "net-layer").len(), 1);

    let refreshed =
        fs::read_to_string(second.join("package-lists/rpm-requirements.txt")).unwrap();
    assert_eq!(refreshed, "curl\nvim\n");
}

#[test]
fn git_descriptor_resolves_to_cached_working_copy() {
    let env = TestEnv::new();
    let source = env.root().join("remote/net-layer");
    fs::create_dir_all(&source).unwrap();
    write_layer_file(&source, "configs/etc/resolv.conf", "nameserver 10.0.0.1\n");
    init_git_source(&source);

    let descriptor = LayerDescriptor::Git {
        url: source.to_string_lossy().into_owned(),
        branch_or_tag: "main".to_string(),
    };
    let cache = LayerCache::new(&env.settings.cache_dir);

    let layer = resolve::resolve(&descriptor, &env.settings, &cache).unwrap();
    assert_eq!(layer.name, "net-layer");
    assert!(layer.path.starts_with(&env.settings.cache_dir));
    assert!(layer.path.join("configs/etc/resolv.conf").exists());
}

#[test]
fn failed_clone_aborts_with_layer_name() {
    let env = TestEnv::new();
    let cache = LayerCache::new(&env.settings.cache_dir);

    let descriptor = LayerDescriptor::Git {
        url: env.root().join("remote/no-such-layer").to_string_lossy().into_owned(),
        branch_or_tag: "main".to_string(),
    };

    let err = resolve::resolve(&descriptor, &env.settings, &cache).unwrap_err();
    assert!(format!("{:#}", err).contains("no-such-layer"));
}

#[test]
fn imported_layer_shows_in_inventory_with_provenance() {
    let env = TestEnv::new();
    let source = env.root().join("remote/net-layer");
    fs::create_dir_all(&source).unwrap();
    write_layer_file(&source, "configs/etc/motd", "hi\n");
    init_git_source(&source);

    let url = source.to_string_lossy().into_owned();
    let cache = LayerCache::new(&env.settings.cache_dir);
    fetch_remote(&cache, &url, None).unwrap();

    let entries = inventory::list(&env.settings).unwrap();
    let imported: Vec<_> = entries.iter().filter(|e| e.name == "net-layer").collect();
    assert_eq!(imported.len(), 1);
    assert_eq!(imported[0].source, url);
}

#[test]
fn distinct_urls_with_same_segment_do_not_alias() {
    let env = TestEnv::new();
    let cache = LayerCache::new(&env.settings.cache_dir);

    for org in ["alpha", "beta"] {
        let source = env.root().join(org).join("net-layer");
        fs::create_dir_all(&source).unwrap();
        write_layer_file(&source, "configs/etc/org", &format!("{}\n", org));
        init_git_source(&source);
        fetch_remote(&cache, &source.to_string_lossy(), None).unwrap();
    }

    assert_eq!(cache_entries(&env, "net-layer").len(), 2);
}

#[test]
fn layer_name_derivation_matches_url_segment() {
    assert_eq!(
        cache::layer_name("https://example.com/x/net-layer").unwrap(),
        "net-layer"
    );
}
