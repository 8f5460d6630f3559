use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::api::LoadContext;
use crate::error::{Error, Result};
use crate::game::{GameRecord, GameRecordBuilder};
use crate::resource::ResourceResolver;

/// Entry point every game module implements.
///
/// `main` is invoked exactly once per load, after the module has been
/// instantiated and before its record is considered finished.
pub trait GameModule: Send + Sync {
    fn main(&self, ctx: &mut LoadContext<'_>) -> Result<()>;
}

/// Factory function type for instantiating a game module.
pub type GameModuleFactory = fn() -> Box<dyn GameModule>;

/// Registration table mapping module ids to factories.
#[derive(Default)]
pub struct ModuleTable {
    factories: HashMap<String, GameModuleFactory>,
}

impl ModuleTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, module_id: &str, factory: GameModuleFactory) -> Result<()> {
        if self.factories.contains_key(module_id) {
            return Err(Error::Config(format!(
                "game module '{module_id}' is registered twice"
            )));
        }
        self.factories.insert(module_id.to_string(), factory);
        Ok(())
    }

    pub fn create(&self, module_id: &str) -> Option<Box<dyn GameModule>> {
        self.factories.get(module_id).map(|f| f())
    }

    pub fn contains(&self, module_id: &str) -> bool {
        self.factories.contains_key(module_id)
    }

    /// Registered module ids, sorted.
    pub fn ids(&self) -> Vec<&str> {
        let mut ids: Vec<&str> = self.factories.keys().map(String::as_str).collect();
        ids.sort_unstable();
        ids
    }

    /// Return the number of registered game modules.
    pub fn len(&self) -> usize {
        self.factories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.factories.is_empty()
    }
}

/// Releases the loader's in-progress flag when dropped.
struct LoadGuard<'a>(&'a AtomicBool);

impl<'a> LoadGuard<'a> {
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self(flag))
    }
}

impl Drop for LoadGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// Instantiates game modules and turns them into finished game records.
pub struct ModuleLoader {
    table: ModuleTable,
    resolver: ResourceResolver,
    loading: AtomicBool,
}

impl ModuleLoader {
    pub fn new(table: ModuleTable, resolver: ResourceResolver) -> Self {
        Self {
            table,
            resolver,
            loading: AtomicBool::new(false),
        }
    }

    pub fn table(&self) -> &ModuleTable {
        &self.table
    }

    pub fn resolver(&self) -> &ResourceResolver {
        &self.resolver
    }

    /// Load `module_id`, inheriting from `parent` when given.
    ///
    /// Only one load may run on a loader at a time. On any failure the
    /// partially built record is discarded.
    pub fn load(&self, module_id: &str, parent: Option<Arc<GameRecord>>) -> Result<Arc<GameRecord>> {
        let _span = tracing::info_span!(
            "load_module",
            module_id,
            parent = parent.as_ref().map(|p| p.module_id())
        )
        .entered();

        let _guard = LoadGuard::acquire(&self.loading).ok_or_else(|| {
            Error::module_load(module_id, Error::LoadInProgress(module_id.to_string()))
        })?;

        let module: Arc<dyn GameModule> = self
            .table
            .create(module_id)
            .map(Arc::from)
            .ok_or_else(|| Error::module_load(module_id, Error::UnknownModule(module_id.to_string())))?;

        let mut ctx = LoadContext::new(GameRecordBuilder::create(module_id, parent), &self.resolver);
        if let Err(e) = module.main(&mut ctx) {
            tracing::error!(error = %e, "game module entry point failed");
            return Err(Error::module_load(module_id, e));
        }

        let record = ctx.into_record().build(module);
        tracing::info!(
            name = record.display_name(),
            level_types = record.level_types().len(),
            "game module loaded"
        );
        Ok(Arc::new(record))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::level::LevelTypeHandle;
    use crate::test_helpers::{FakeLevelType, FnModule, noop_main};

    fn named_main(ctx: &mut LoadContext<'_>) -> Result<()> {
        ctx.set_game_name("Named");
        ctx.add_level_type(LevelTypeHandle::new(FakeLevelType::new("fake", b"FAKE")))
    }

    fn failing_main(ctx: &mut LoadContext<'_>) -> Result<()> {
        ctx.set_game_name("Half built");
        Err(Error::Module("boom".into()))
    }

    fn loader() -> ModuleLoader {
        let mut table = ModuleTable::new();
        table.register("named", || Box::new(FnModule(named_main))).unwrap();
        table.register("failing", || Box::new(FnModule(failing_main))).unwrap();
        table.register("empty", || Box::new(FnModule(noop_main))).unwrap();
        ModuleLoader::new(table, ResourceResolver::new("unused"))
    }

    #[test]
    fn table_rejects_duplicate_ids() {
        let mut table = ModuleTable::new();
        table.register("a", || Box::new(FnModule(noop_main))).unwrap();
        assert!(matches!(
            table.register("a", || Box::new(FnModule(noop_main))),
            Err(Error::Config(_))
        ));
        assert_eq!(table.ids(), vec!["a"]);
    }

    #[test]
    fn load_runs_entry_point() {
        let record = loader().load("named", None).unwrap();
        assert_eq!(record.module_id(), "named");
        assert_eq!(record.display_name(), "Named");
        assert_eq!(record.level_types().len(), 1);
    }

    #[test]
    fn unknown_module_is_load_error() {
        let err = loader().load("missing", None).unwrap_err();
        match err {
            Error::ModuleLoad { module_id, source } => {
                assert_eq!(module_id, "missing");
                assert!(matches!(*source, Error::UnknownModule(_)));
            },
            other => panic!("expected ModuleLoad, got {other:?}"),
        }
    }

    #[test]
    fn failing_entry_point_is_load_error_and_loader_recovers() {
        let loader = loader();
        let err = loader.load("failing", None).unwrap_err();
        assert!(matches!(err, Error::ModuleLoad { ref module_id, .. } if module_id == "failing"));
        // The in-progress guard was released.
        assert!(loader.load("empty", None).is_ok());
    }

    #[test]
    fn child_inherits_parent_level_types() {
        let loader = loader();
        let parent = loader.load("named", None).unwrap();
        let child = loader.load("empty", Some(Arc::clone(&parent))).unwrap();
        assert_eq!(child.display_name(), "Named");
        assert_eq!(child.level_types(), parent.level_types());
        assert_eq!(child.lineage(), vec!["named", "empty"]);
    }

    #[test]
    fn concurrent_load_is_rejected() {
        let loader = loader();
        let _held = LoadGuard::acquire(&loader.loading).unwrap();
        let err = loader.load("empty", None).unwrap_err();
        match err {
            Error::ModuleLoad { source, .. } => {
                assert!(matches!(*source, Error::LoadInProgress(_)));
            },
            other => panic!("expected ModuleLoad, got {other:?}"),
        }
    }
}
