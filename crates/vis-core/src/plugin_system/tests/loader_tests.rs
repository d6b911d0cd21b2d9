use std::any::Any;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tempfile::tempdir;

use super::mocks::{AlphaPlugin, BetaPlugin, GammaPlugin};
use crate::kernel::constants;
use crate::kernel::container::{DefinitionContainer, ServiceContainer, ServiceDefinition};
use crate::kernel::error::{Error, Result};
use crate::plugin_system::error::{PluginLoadError, PluginSystemError};
use crate::plugin_system::factory::ClassRegistry;
use crate::plugin_system::loader::{
    ActiveBundle, JsonManifestSource, KernelPluginLoader, LoaderState, ManifestSource,
};
use crate::plugin_system::manifest::{Autoload, MappingStrategy, PluginManifestEntry};
use crate::plugin_system::module_loader::{ClassMap, ModuleLoader, NamespaceLoader};
use crate::plugin_system::traits::{KernelPlugin, TypeKey};

#[derive(Debug, Default)]
struct LoaderLog {
    namespaces: Vec<(String, Vec<PathBuf>, MappingStrategy)>,
    class_maps: Vec<ClassMap>,
}

/// Module loader recording registrations, resolving nothing
#[derive(Debug, Default)]
struct RecordingLoader {
    authoritative: bool,
    log: Arc<Mutex<LoaderLog>>,
}

impl ModuleLoader for RecordingLoader {
    fn add_namespace(&mut self, prefix: &str, dirs: Vec<PathBuf>, strategy: MappingStrategy) {
        self.log
            .lock()
            .unwrap()
            .namespaces
            .push((prefix.to_string(), dirs, strategy));
    }

    fn resolve_type_file(&self, _class: &str) -> Option<PathBuf> {
        None
    }

    fn is_class_map_authoritative(&self) -> bool {
        self.authoritative
    }

    fn add_class_map(&mut self, map: ClassMap) {
        self.log.lock().unwrap().class_maps.push(map);
    }
}

/// Counts how often manifests are loaded
struct CountingSource {
    entries: Vec<PluginManifestEntry>,
    loads: Arc<AtomicUsize>,
}

#[async_trait]
impl ManifestSource for CountingSource {
    async fn load_manifests(&self) -> Result<Vec<PluginManifestEntry>> {
        self.loads.fetch_add(1, Ordering::SeqCst);
        Ok(self.entries.clone())
    }
}

fn write_source(project: &Path, relative: &str, content: &str) {
    let file = project.join(relative);
    fs::create_dir_all(file.parent().unwrap()).unwrap();
    fs::write(file, content).unwrap();
}

fn entry(name: &str, class: &str, prefix: &str, active: bool) -> PluginManifestEntry {
    PluginManifestEntry::new(name, class, &format!("plugins/{}", name))
        .with_mapping(MappingStrategy::Prefix, prefix, &["src"])
        .with_active(active)
}

fn test_classes() -> ClassRegistry {
    let mut classes = ClassRegistry::new();
    classes.register_plugin("Acme::Foo::FooPlugin", AlphaPlugin::boxed);
    classes.register_plugin("Acme::Bar::BarPlugin", BetaPlugin::boxed);
    classes
}

fn recording_loader(
    entries: Vec<PluginManifestEntry>,
    authoritative: bool,
) -> (KernelPluginLoader, Arc<Mutex<LoaderLog>>) {
    let log = Arc::new(Mutex::new(LoaderLog::default()));
    let module_loader = RecordingLoader {
        authoritative,
        log: Arc::clone(&log),
    };
    let loader = KernelPluginLoader::new(Box::new(entries), Box::new(module_loader), test_classes());
    (loader, log)
}

fn namespace_loader(entries: Vec<PluginManifestEntry>, classes: ClassRegistry) -> KernelPluginLoader {
    KernelPluginLoader::new(Box::new(entries), Box::new(NamespaceLoader::default()), classes)
}

#[tokio::test]
async fn test_empty_manifest_initializes_empty_registry() -> Result<()> {
    let (mut loader, log) = recording_loader(Vec::new(), false);
    loader.initialize(Path::new("/project")).await?;

    assert_eq!(loader.state(), LoaderState::Instantiated);
    assert!(loader.registry().is_empty());
    assert!(log.lock().unwrap().namespaces.is_empty());
    Ok(())
}

#[tokio::test]
async fn test_missing_autoload_names_plugin() {
    let mut unnamed = PluginManifestEntry::new("", "Acme::Foo::FooPlugin", "plugins/Foo");
    unnamed.autoload = None;
    let named = PluginManifestEntry::new("Foo", "Acme::Foo::FooPlugin", "plugins/Foo");

    let (mut loader, _) = recording_loader(vec![named], false);
    let err = loader.initialize(Path::new("/project")).await.unwrap_err();
    assert_eq!(
        err.as_load_error(),
        Some(&PluginLoadError::AutoloadMissing {
            plugin: "Foo".to_string()
        })
    );

    let (mut loader, _) = recording_loader(vec![unnamed], false);
    let err = loader.initialize(Path::new("/project")).await.unwrap_err();
    assert_eq!(
        err.as_load_error(),
        Some(&PluginLoadError::AutoloadMissing {
            plugin: "Acme::Foo::FooPlugin".to_string()
        })
    );
}

#[tokio::test]
async fn test_empty_autoload_is_missing_strategy() {
    let mut entry = PluginManifestEntry::new("Foo", "Acme::Foo::FooPlugin", "plugins/Foo");
    entry.autoload = Some(Autoload::default());

    let (mut loader, _) = recording_loader(vec![entry], false);
    let err = loader.initialize(Path::new("/project")).await.unwrap_err();
    assert!(matches!(
        err.as_load_error(),
        Some(PluginLoadError::MappingStrategyMissing { plugin }) if plugin == "Foo"
    ));
}

#[tokio::test]
async fn test_plugin_outside_project_fails() {
    let mut entry = entry("Evil", "Acme::Evil::EvilPlugin", "Acme::Evil", true);
    entry.path = "../elsewhere/Evil".to_string();

    let (mut loader, log) = recording_loader(vec![entry], false);
    let err = loader.initialize(Path::new("/project")).await.unwrap_err();
    assert!(matches!(
        err.as_load_error(),
        Some(PluginLoadError::PathOutsideProject { plugin, .. }) if plugin == "Evil"
    ));
    assert!(log.lock().unwrap().namespaces.is_empty());
    assert_eq!(loader.state(), LoaderState::ManifestsLoaded);
}

#[tokio::test]
async fn test_shared_prefix_without_class_map_generation() -> Result<()> {
    let entries = vec![
        entry("Foo", "Acme::Foo::FooPlugin", "Acme", true),
        entry("Bar", "Acme::Bar::BarPlugin", "Acme", true),
    ];
    let (mut loader, log) = recording_loader(entries, false);
    loader.initialize(Path::new("/project")).await?;

    let log = log.lock().unwrap();
    assert_eq!(
        log.namespaces,
        vec![
            (
                "Acme".to_string(),
                vec![PathBuf::from("/project/plugins/Foo/src")],
                MappingStrategy::Prefix
            ),
            (
                "Acme".to_string(),
                vec![PathBuf::from("/project/plugins/Bar/src")],
                MappingStrategy::Prefix
            ),
        ]
    );
    assert!(log.class_maps.is_empty());
    // Nothing resolves through the recording loader, so nothing is instantiated
    assert!(loader.registry().is_empty());
    Ok(())
}

#[tokio::test]
async fn test_authoritative_loader_generates_class_maps() -> Result<()> {
    let project = tempdir().unwrap();
    write_source(project.path(), "plugins/Foo/src/foo_plugin.rs", "pub struct FooPlugin;\n");

    let foo = PluginManifestEntry::new("Foo", "Acme::Foo::FooPlugin", "plugins/Foo")
        .with_mapping(MappingStrategy::Prefix, "Acme::Foo", &["src", "extra"]);
    let (mut loader, log) = recording_loader(vec![foo], true);
    loader.initialize(project.path()).await?;

    let log = log.lock().unwrap();
    assert_eq!(log.class_maps.len(), 2);
    assert_eq!(
        log.class_maps[0].get("Acme::Foo::FooPlugin"),
        Some(&project.path().join("plugins/Foo/src/foo_plugin.rs"))
    );
    assert!(log.class_maps[1].is_empty());
    Ok(())
}

#[tokio::test]
async fn test_bootstrap_instantiates_resolvable_plugins() -> Result<()> {
    let project = tempdir().unwrap();
    write_source(project.path(), "plugins/Foo/src/foo_plugin.rs", "pub struct FooPlugin;\n");
    write_source(project.path(), "plugins/Bar/src/bar_plugin.rs", "pub struct BarPlugin;\n");
    write_source(project.path(), "plugins/Orphan/src/orphan_plugin.rs", "pub struct OrphanPlugin;\n");

    let mut no_class = entry("NoClass", "", "Acme::NoClass", true);
    no_class.base_class = None;
    let entries = vec![
        entry("Foo", "Acme::Foo::FooPlugin", "Acme::Foo", true),
        entry("Bar", "Acme::Bar::BarPlugin", "Acme::Bar", false),
        // Source file removed
        entry("Ghost", "Acme::Ghost::GhostPlugin", "Acme::Ghost", true),
        // No constructor registered
        entry("Orphan", "Acme::Orphan::OrphanPlugin", "Acme::Orphan", true),
        no_class,
    ];

    let mut loader = namespace_loader(entries, test_classes());
    loader.initialize(project.path()).await?;

    assert_eq!(loader.manifests().len(), 5);
    assert_eq!(loader.registry().names(), vec!["Alpha", "Beta"]);

    let alpha = loader.active_instance::<AlphaPlugin>().unwrap();
    assert_eq!(alpha.args.path, "plugins/Foo");
    assert_eq!(alpha.args.project_root, project.path().to_path_buf());
    assert!(loader.active_instance::<BetaPlugin>().is_none());
    assert!(loader.registry().has::<BetaPlugin>());
    assert!(loader
        .active_instance_by_key(&TypeKey::of::<AlphaPlugin>())
        .is_some());
    assert!(loader
        .active_instance_by_key(&TypeKey::of::<BetaPlugin>())
        .is_none());
    Ok(())
}

#[tokio::test]
async fn test_non_plugin_class_aborts_bootstrap() {
    let project = tempdir().unwrap();
    write_source(project.path(), "plugins/Helper/src/helper.rs", "pub struct Helper;\n");

    let mut classes = test_classes();
    classes.register_type("Acme::Helper::Helper", |_| {
        Box::new(String::from("not a plugin")) as Box<dyn Any + Send + Sync>
    });
    let mut loader = namespace_loader(
        vec![entry("Helper", "Acme::Helper::Helper", "Acme::Helper", true)],
        classes,
    );

    let err = loader.initialize(project.path()).await.unwrap_err();
    assert!(matches!(
        err.as_load_error(),
        Some(PluginLoadError::BaseTypeMismatch { plugin, class })
            if plugin == "Helper" && class == "Acme::Helper::Helper"
    ));
}

#[tokio::test]
async fn test_initialize_is_idempotent() -> Result<()> {
    let loads = Arc::new(AtomicUsize::new(0));
    let source = CountingSource {
        entries: Vec::new(),
        loads: Arc::clone(&loads),
    };
    let mut loader = KernelPluginLoader::new(
        Box::new(source),
        Box::new(NamespaceLoader::default()),
        ClassRegistry::new(),
    );

    loader.initialize(Path::new("/project")).await?;
    loader.initialize(Path::new("/project")).await?;
    assert_eq!(loads.load(Ordering::SeqCst), 1);
    Ok(())
}

#[tokio::test]
async fn test_phases_enforce_order() {
    let (mut loader, _) = recording_loader(Vec::new(), false);
    let err = loader.register_namespaces(Path::new("/project")).unwrap_err();
    assert!(matches!(
        err,
        Error::PluginSystem(PluginSystemError::InvalidState {
            state: LoaderState::Uninitialized,
            expected: LoaderState::ManifestsLoaded,
        })
    ));
    assert!(loader.instantiate_plugins(Path::new("/project")).is_err());
}

async fn loader_with_plugins() -> Result<(KernelPluginLoader, tempfile::TempDir)> {
    let project = tempdir().unwrap();
    write_source(project.path(), "plugins/Foo/src/foo_plugin.rs", "pub struct FooPlugin;\n");
    write_source(project.path(), "plugins/Bar/src/bar_plugin.rs", "pub struct BarPlugin;\n");
    write_source(project.path(), "plugins/Baz/src/baz_plugin.rs", "pub struct BazPlugin;\n");

    let mut classes = test_classes();
    classes.register_plugin("Acme::Baz::BazPlugin", GammaPlugin::boxed);
    let mut loader = namespace_loader(
        vec![
            entry("Foo", "Acme::Foo::FooPlugin", "Acme::Foo", true),
            entry("Bar", "Acme::Bar::BarPlugin", "Acme::Bar", false),
            entry("Baz", "Acme::Baz::BazPlugin", "Acme::Baz", true),
        ],
        classes,
    );
    loader.initialize(project.path()).await?;
    Ok((loader, project))
}

#[tokio::test]
async fn test_active_bundles_deduplicates() -> Result<()> {
    let (loader, _project) = loader_with_plugins().await?;

    let mut already_loaded = vec!["Gamma".to_string()];
    let names: Vec<String> = loader
        .active_bundles(&mut already_loaded)
        .map(|bundle| bundle.name().to_string())
        .collect();
    assert_eq!(names, vec!["Alpha".to_string(), constants::HOST_BUNDLE_NAME.to_string()]);
    assert_eq!(already_loaded, vec!["Gamma", "Alpha", constants::HOST_BUNDLE_NAME]);

    assert_eq!(loader.active_bundles(&mut already_loaded).count(), 0);
    Ok(())
}

#[tokio::test]
async fn test_active_bundles_is_lazy() -> Result<()> {
    let (loader, _project) = loader_with_plugins().await?;

    let mut already_loaded = Vec::new();
    {
        let mut bundles = loader.active_bundles(&mut already_loaded);
        let first = bundles.next().unwrap();
        assert!(matches!(first, ActiveBundle::Plugin(ref p) if p.name() == "Alpha"));
    }
    assert_eq!(already_loaded, vec!["Alpha"]);

    let rest: Vec<String> = loader
        .active_bundles(&mut already_loaded)
        .map(|b| b.name().to_string())
        .collect();
    assert_eq!(rest, vec!["Gamma".to_string(), constants::HOST_BUNDLE_NAME.to_string()]);
    Ok(())
}

#[tokio::test]
async fn test_attach_to_container() -> Result<()> {
    let alpha_id = TypeKey::of::<AlphaPlugin>().name();
    let beta_id = TypeKey::of::<BetaPlugin>().name();
    let gamma_id = TypeKey::of::<GammaPlugin>().name();

    let (uninitialized, _) = recording_loader(Vec::new(), false);
    let container = DefinitionContainer::new();
    uninitialized.attach_to_container(&container);
    assert!(container.is_empty());

    let (loader, _project) = loader_with_plugins().await?;
    container.register(gamma_id, ServiceDefinition::new("custom"));

    loader.attach_to_container(&container);

    let alpha = container.definition(alpha_id).unwrap();
    assert!(alpha.autowired && alpha.public);
    assert_eq!(alpha.class, alpha_id);
    assert!(!container.has(beta_id));

    let gamma = container.definition(gamma_id).unwrap();
    assert_eq!(gamma.class, "custom");
    assert!(gamma.autowired && gamma.public);
    Ok(())
}

#[tokio::test]
async fn test_json_manifest_source() -> Result<()> {
    let dir = tempdir().unwrap();
    let path = dir.path().join("plugins.json");

    let source = JsonManifestSource::new(&path);
    assert!(source.load_manifests().await?.is_empty());

    fs::write(&path, r#"[{"name": "Foo", "baseClass": "Acme::Foo::FooPlugin", "path": "plugins/Foo"}, 3]"#)
        .unwrap();
    let entries = source.load_manifests().await?;
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].name, "Foo");

    fs::write(&path, "not json").unwrap();
    let err = source.load_manifests().await.unwrap_err();
    assert!(matches!(
        err,
        Error::PluginSystem(PluginSystemError::ManifestError { .. })
    ));
    Ok(())
}

#[tokio::test]
async fn test_loader_from_config() -> Result<()> {
    let project = tempdir().unwrap();
    write_source(project.path(), "plugins/Foo/src/foo_plugin.rs", "pub struct FooPlugin;\n");
    let manifest = serde_json::to_string_pretty(&vec![entry("Foo", "Acme::Foo::FooPlugin", "Acme::Foo", true)])
        .unwrap();
    write_source(project.path(), "plugins/plugins.json", &manifest);

    let config = crate::storage::config::VisConfig::for_project(project.path());
    let mut loader = KernelPluginLoader::from_config(&config, test_classes());
    loader.initialize(project.path()).await?;

    assert!(loader.active_instance::<AlphaPlugin>().is_some());
    let plugin: &dyn KernelPlugin = loader.registry().all()[0].as_ref();
    assert_eq!(plugin.path(), "plugins/Foo");
    Ok(())
}
