//! Game catalog parsing.
//!
//! The catalog is an XML tree of `category`, `abstractgame`, and `game`
//! elements. It is walked once in document order: every game is loaded as
//! soon as it is seen, so parents must be declared before their children.
//!
//! ```xml
//! <games>
//!   <abstractgame id="base" />
//!   <category id="Series">
//!     <game id="child" parentid="base" />
//!   </category>
//! </games>
//! ```

use std::path::Path;
use std::sync::Arc;

use roxmltree::{Document, Node};
use serde::Serialize;

use crate::error::{Error, Result};
use crate::game::GameRecord;
use crate::module::ModuleLoader;
use crate::registry::GameRegistry;

/// Presentation tree mirroring the catalog's categories.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum HierarchyNode {
    Category {
        id: String,
        children: Vec<HierarchyNode>,
    },
    /// Reference into the concrete game table.
    Game { id: String },
}

impl HierarchyNode {
    pub fn id(&self) -> &str {
        match self {
            HierarchyNode::Category { id, .. } | HierarchyNode::Game { id } => id,
        }
    }

    pub fn is_category(&self) -> bool {
        matches!(self, HierarchyNode::Category { .. })
    }

    pub fn children(&self) -> &[HierarchyNode] {
        match self {
            HierarchyNode::Category { children, .. } => children,
            HierarchyNode::Game { .. } => &[],
        }
    }

    /// Game ids under this node in document order.
    pub fn game_ids(&self) -> Vec<&str> {
        let mut ids = Vec::new();
        collect_game_ids(std::slice::from_ref(self), &mut ids);
        ids
    }
}

fn collect_game_ids<'a>(nodes: &'a [HierarchyNode], out: &mut Vec<&'a str>) {
    for node in nodes {
        match node {
            HierarchyNode::Category { children, .. } => collect_game_ids(children, out),
            HierarchyNode::Game { id } => out.push(id),
        }
    }
}

/// Result of loading a catalog: the presentation tree plus flat tables.
#[derive(Debug)]
pub struct GameCatalog {
    hierarchy: Vec<HierarchyNode>,
    registry: GameRegistry,
}

impl GameCatalog {
    pub fn hierarchy(&self) -> &[HierarchyNode] {
        &self.hierarchy
    }

    pub fn registry(&self) -> &GameRegistry {
        &self.registry
    }

    /// Every game id in the tree, in document order.
    pub fn game_ids(&self) -> Vec<&str> {
        let mut ids = Vec::new();
        collect_game_ids(&self.hierarchy, &mut ids);
        ids
    }

    pub fn into_parts(self) -> (Vec<HierarchyNode>, GameRegistry) {
        (self.hierarchy, self.registry)
    }
}

/// Read and load the catalog at `path`.
pub fn load_catalog_file(path: &Path, loader: &ModuleLoader) -> Result<GameCatalog> {
    let source = std::fs::read_to_string(path)
        .map_err(|e| Error::Config(format!("cannot read catalog {}: {e}", path.display())))?;
    tracing::info!(path = %path.display(), "loading game catalog");
    load_catalog(&source, loader)
}

/// Parse `source` and load every game it declares through `loader`.
pub fn load_catalog(source: &str, loader: &ModuleLoader) -> Result<GameCatalog> {
    let doc = Document::parse(source).map_err(|e| Error::Config(format!("malformed catalog: {e}")))?;

    let mut registry = GameRegistry::new();
    let hierarchy = parse_children(doc.root_element(), loader, &mut registry)?;

    let catalog = GameCatalog {
        hierarchy,
        registry,
    };
    if let Some(dangling) = catalog
        .game_ids()
        .into_iter()
        .find(|id| catalog.registry.get(id).is_none())
    {
        return Err(Error::Config(format!("hierarchy references unknown game '{dangling}'")));
    }

    tracing::info!(
        games = catalog.registry.len(),
        abstract_games = catalog.registry.abstract_ids().len(),
        "game catalog loaded"
    );
    Ok(catalog)
}

fn parse_children(
    parent: Node<'_, '_>,
    loader: &ModuleLoader,
    registry: &mut GameRegistry,
) -> Result<Vec<HierarchyNode>> {
    let mut items = Vec::new();

    for node in parent.children().filter(Node::is_element) {
        let tag = node.tag_name().name().to_ascii_lowercase();
        match tag.as_str() {
            "category" => {
                let id = required_attr(node, "id")?;
                let children = parse_children(node, loader, registry)?;
                items.push(HierarchyNode::Category {
                    id: id.to_string(),
                    children,
                });
            },
            "abstractgame" => {
                // Abstract games are loaded as roots and never shown.
                let id = unique_id(node, registry)?;
                if let Some(parent_id) = node.attribute("parentid") {
                    tracing::debug!(id, parent_id, "ignoring parentid on abstract game");
                }
                registry.insert_abstract(loader.load(id, None)?)?;
            },
            "game" => {
                let id = unique_id(node, registry)?;
                let parent = resolve_parent(node, id, registry)?;
                registry.insert(loader.load(id, parent)?)?;
                items.push(HierarchyNode::Game { id: id.to_string() });
            },
            other => {
                tracing::debug!(element = other, "ignoring unknown catalog element");
            },
        }
    }

    Ok(items)
}

fn required_attr<'a>(node: Node<'a, '_>, name: &str) -> Result<&'a str> {
    node.attribute(name).filter(|v| !v.is_empty()).ok_or_else(|| {
        let pos = node.document().text_pos_at(node.range().start);
        Error::Config(format!(
            "<{}> at {pos} is missing attribute '{name}'",
            node.tag_name().name()
        ))
    })
}

fn unique_id<'a>(node: Node<'a, '_>, registry: &GameRegistry) -> Result<&'a str> {
    let id = required_attr(node, "id")?;
    if registry.contains_id(id) {
        return Err(Error::Config(format!("duplicate game id '{id}'")));
    }
    Ok(id)
}

fn resolve_parent(node: Node<'_, '_>, id: &str, registry: &GameRegistry) -> Result<Option<Arc<GameRecord>>> {
    let Some(parent_id) = node.attribute("parentid").filter(|v| !v.is_empty()) else {
        return Ok(None);
    };
    registry
        .resolve_parent(parent_id)
        .map(|record| Some(Arc::clone(record)))
        .ok_or_else(|| {
            Error::Config(format!(
                "game '{id}' inherits from '{parent_id}', which is not declared before it"
            ))
        })
}
