use std::fmt::Write as _;
use std::sync::Arc;

use serde::Serialize;
use tilewright_core::registry::GameSummary;
use tilewright_core::{GameCatalog, GameRegistry, HierarchyNode};

use crate::config::EditorConfig;
use crate::icons::AppIcons;
use crate::session::Session;

/// A booted editor: the loaded catalog plus the state built on it.
pub struct Editor {
    config: EditorConfig,
    hierarchy: Vec<HierarchyNode>,
    registry: Arc<GameRegistry>,
    icons: AppIcons,
    session: Session,
}

/// Machine-readable game listing for `list --json`.
#[derive(Debug, Serialize)]
pub struct Listing<'a> {
    pub hierarchy: &'a [HierarchyNode],
    pub games: Vec<GameSummary>,
}

impl Editor {
    pub fn new(config: EditorConfig, catalog: GameCatalog) -> Self {
        let (hierarchy, registry) = catalog.into_parts();
        let registry = Arc::new(registry);
        let session = Session::new(Arc::clone(&registry), config.session.max_open_documents);
        let icons = AppIcons::new(&config.data_dir);
        Self {
            config,
            hierarchy,
            registry,
            icons,
            session,
        }
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn hierarchy(&self) -> &[HierarchyNode] {
        &self.hierarchy
    }

    pub fn registry(&self) -> &GameRegistry {
        &self.registry
    }

    pub fn icons(&mut self) -> &mut AppIcons {
        &mut self.icons
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn session_mut(&mut self) -> &mut Session {
        &mut self.session
    }

    pub fn listing(&self) -> Listing<'_> {
        Listing {
            hierarchy: &self.hierarchy,
            games: self.registry.summaries(),
        }
    }

    /// Indented game picker tree. Games show their display name and id.
    pub fn render_tree(&self) -> String {
        let mut out = String::new();
        for node in &self.hierarchy {
            self.render_node(node, 0, &mut out);
        }
        out
    }

    fn render_node(&self, node: &HierarchyNode, depth: usize, out: &mut String) {
        let indent = "  ".repeat(depth);
        match node {
            HierarchyNode::Category { id, children } => {
                let _ = writeln!(out, "{indent}{id}/");
                for child in children {
                    self.render_node(child, depth + 1, out);
                }
            },
            HierarchyNode::Game { id } => {
                let name = self
                    .registry
                    .get(id)
                    .map(|game| game.display_name())
                    .unwrap_or(id.as_str());
                let _ = writeln!(out, "{indent}{name} [{id}]");
            },
        }
    }
}
