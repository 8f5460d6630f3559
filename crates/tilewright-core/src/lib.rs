pub mod api;
pub mod catalog;
pub mod document;
pub mod error;
pub mod game;
pub mod item;
pub mod level;
pub mod module;
pub mod registry;
pub mod resource;
pub mod text;

pub use api::LoadContext;
pub use catalog::{GameCatalog, HierarchyNode, load_catalog, load_catalog_file};
pub use document::{LevelDocument, LevelState};
pub use error::{Error, LevelError, Result};
pub use game::{GameRecord, GameRecordBuilder};
pub use item::{ItemType, ItemTypeRegistry, LevelItem};
pub use level::{Dimensions, Level, Level2d, LevelTemplate, LevelType, LevelTypeHandle};
pub use module::{GameModule, GameModuleFactory, ModuleLoader, ModuleTable};
pub use registry::GameRegistry;
pub use resource::{Icon, ResourceResolver};

#[cfg(any(test, feature = "test-helpers"))]
pub mod test_helpers {
    use std::any::Any;
    use std::path::Path;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use crate::api::LoadContext;
    use crate::error::{LevelError, Result};
    use crate::item::{ItemType, ItemTypeRegistry, LevelItem};
    use crate::level::{Dimensions, Level, Level2d, LevelTemplate, LevelType};
    use crate::module::GameModule;
    use crate::resource::Icon;

    /// Game module backed by a plain function.
    ///
    /// Register with a non-capturing closure:
    /// `table.register("id", || Box::new(FnModule(my_main)))`.
    pub struct FnModule(pub fn(&mut LoadContext<'_>) -> Result<()>);

    impl GameModule for FnModule {
        fn main(&self, ctx: &mut LoadContext<'_>) -> Result<()> {
            (self.0)(ctx)
        }
    }

    /// Entry point that registers nothing.
    pub fn noop_main(_ctx: &mut LoadContext<'_>) -> Result<()> {
        Ok(())
    }

    /// Create an empty file at `<root>/<module_id>/<name>`, with parents.
    pub fn write_resource(root: &Path, module_id: &str, name: &str) {
        let path = root.join(module_id).join(name);
        if let Some(dir) = path.parent() {
            std::fs::create_dir_all(dir).expect("create resource dir");
        }
        std::fs::write(&path, b"").expect("write resource");
    }

    #[derive(Debug, Clone, PartialEq, Eq)]
    pub struct FakeItem {
        type_name: String,
        sort: i32,
        position: (i32, i32),
    }

    impl FakeItem {
        pub fn new(type_name: &str, sort: i32, position: (i32, i32)) -> Self {
            Self {
                type_name: type_name.to_string(),
                sort,
                position,
            }
        }
    }

    impl LevelItem for FakeItem {
        fn type_name(&self) -> &str {
            &self.type_name
        }

        fn position(&self) -> (i32, i32) {
            self.position
        }

        fn sort(&self) -> i32 {
            self.sort
        }

        fn as_any(&self) -> &dyn Any {
            self
        }
    }

    pub struct FakeItemType {
        name: String,
        sort: i32,
    }

    impl FakeItemType {
        pub fn new(name: &str, sort: i32) -> Self {
            Self {
                name: name.to_string(),
                sort,
            }
        }
    }

    impl ItemType for FakeItemType {
        fn name(&self) -> &str {
            &self.name
        }

        fn sort(&self) -> i32 {
            self.sort
        }

        fn spawn(&self, x: i32, y: i32) -> Box<dyn LevelItem> {
            Box::new(FakeItem::new(&self.name, self.sort, (x, y)))
        }
    }

    #[derive(Debug, Default)]
    pub struct FakeLevel {
        pub body: Level2d,
    }

    impl Level for FakeLevel {
        fn items(&self) -> &[Box<dyn LevelItem>] {
            self.body.items()
        }

        fn add_item(&mut self, item: Box<dyn LevelItem>) {
            self.body.insert(item);
        }

        fn remove_item(&mut self, index: usize) -> Option<Box<dyn LevelItem>> {
            self.body.remove(index)
        }

        fn as_any(&self) -> &dyn Any {
            self
        }
    }

    /// Level type with a trivial format: `magic`, an item count byte, then
    /// one `(x, y)` byte pair per item.
    pub struct FakeLevelType {
        id: String,
        type_name: String,
        magic: &'static [u8],
        item_names: Vec<&'static str>,
        templates: Vec<LevelTemplate>,
        icon: Icon,
        dimensions: Dimensions,
        init_calls: Arc<AtomicUsize>,
    }

    impl FakeLevelType {
        pub fn new(id: &str, magic: &'static [u8]) -> Self {
            Self {
                id: id.to_string(),
                type_name: format!("Fake {id}"),
                magic,
                item_names: Vec::new(),
                templates: vec![LevelTemplate::new("Blank")],
                icon: Icon::placeholder(),
                dimensions: Dimensions::TwoD,
                init_calls: Arc::new(AtomicUsize::new(0)),
            }
        }

        /// Item types registered during class setup.
        pub fn with_items(mut self, names: &[&'static str]) -> Self {
            self.item_names = names.to_vec();
            self
        }

        pub fn with_dimensions(mut self, dimensions: Dimensions) -> Self {
            self.dimensions = dimensions;
            self
        }

        /// Counter of how often the class setup body ran.
        pub fn init_calls(&self) -> Arc<AtomicUsize> {
            Arc::clone(&self.init_calls)
        }
    }

    impl LevelType for FakeLevelType {
        fn id(&self) -> &str {
            &self.id
        }

        fn type_name(&self) -> &str {
            &self.type_name
        }

        fn icon(&self) -> &Icon {
            &self.icon
        }

        fn dimensions(&self) -> Dimensions {
            self.dimensions
        }

        fn templates(&self) -> &[LevelTemplate] {
            &self.templates
        }

        fn file_extension(&self) -> &str {
            "fake"
        }

        fn register_item_types(&self, registry: &mut ItemTypeRegistry) -> Result<()> {
            self.init_calls.fetch_add(1, Ordering::SeqCst);
            for name in &self.item_names {
                registry.register(Arc::new(FakeItemType::new(name, 0)))?;
            }
            Ok(())
        }

        fn validate(&self, data: &[u8]) -> bool {
            data.starts_with(self.magic)
        }

        fn load_from_bytes(&self, data: &[u8]) -> std::result::Result<Box<dyn Level>, LevelError> {
            let body = &data[self.magic.len()..];
            let (&count, records) = body
                .split_first()
                .ok_or_else(|| LevelError::CorruptData("missing item count".into()))?;
            if records.len() < count as usize * 2 {
                return Err(LevelError::CorruptData("truncated item records".into()));
            }
            let mut level = FakeLevel::default();
            for pair in records.chunks_exact(2).take(count as usize) {
                level.add_item(Box::new(FakeItem::new(
                    "fake-item",
                    0,
                    (pair[0] as i32, pair[1] as i32),
                )));
            }
            Ok(Box::new(level))
        }

        fn new_level(&self, _template: &LevelTemplate) -> Box<dyn Level> {
            Box::new(FakeLevel::default())
        }

        fn save(&self, level: &dyn Level) -> std::result::Result<Vec<u8>, LevelError> {
            let level = level
                .as_any()
                .downcast_ref::<FakeLevel>()
                .ok_or_else(|| LevelError::Format(self.type_name.clone()))?;
            let mut out = self.magic.to_vec();
            out.push(level.body.len() as u8);
            for item in level.items() {
                let (x, y) = item.position();
                out.push(x as u8);
                out.push(y as u8);
            }
            Ok(out)
        }
    }
}
