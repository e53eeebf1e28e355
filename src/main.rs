//! Function node viewer
//!
//! Loads the built-in function node plugin into a registry and shows every
//! placed node with its body drawn through the node's own draw hook.

use std::path::PathBuf;

use eframe::egui;
use egui::Pos2;
use function_nodes::document;
use function_nodes::nodes::{EguiLayout, NodeId};
use function_nodes::{FunctionNodesPlugin, NodeGraph, NodeRegistry, PluginManager};
use log::{error, info};

struct NodeViewer {
    registry: NodeRegistry,
    plugins: PluginManager,
    graph: NodeGraph,
    file_path: PathBuf,
    status: String,
}

impl NodeViewer {
    fn new() -> Self {
        let mut registry = NodeRegistry::new();
        let mut plugins = PluginManager::new();
        if let Err(err) = plugins.load(Box::new(FunctionNodesPlugin), &mut registry) {
            error!("Failed to load function nodes: {}", err);
        }

        let mut viewer = Self {
            registry,
            plugins,
            graph: NodeGraph::new(),
            file_path: PathBuf::from("function_nodes.json"),
            status: String::new(),
        };
        viewer.add_node(function_nodes::constants::node::FLOAT_MATH);
        viewer
    }

    fn add_node(&mut self, node_type: &str) {
        let offset = self.graph.nodes.len() as f32 * 40.0;
        let position = Pos2::new(220.0 + offset, 40.0 + offset);
        match self.registry.add_to_graph(&mut self.graph, node_type, position) {
            Ok(id) => info!("Added {} as node {}", node_type, id),
            Err(err) => error!("{}", err),
        }
    }

    fn side_panel(&mut self, ctx: &egui::Context) {
        egui::SidePanel::left("node_types").show(ctx, |ui| {
            ui.heading("Plugins");
            for info in self.plugins.loaded_plugins() {
                ui.label(format!("{} v{}", info.name, info.version));
            }
            ui.separator();

            ui.heading("Add Node");
            let mut requested = None;
            for category in self.registry.categories() {
                ui.label(category.display_string());
                for node_type in self.registry.nodes_in_category(category) {
                    let label = self
                        .registry
                        .get_metadata(node_type)
                        .map(|meta| format!("{} {}", meta.icon, meta.display_name))
                        .unwrap_or_else(|| node_type.to_string());
                    if ui.button(label).clicked() {
                        requested = Some(node_type.to_string());
                    }
                }
            }
            if let Some(node_type) = requested {
                self.add_node(&node_type);
            }
            ui.separator();

            ui.horizontal(|ui| {
                if ui.button("Save").clicked() {
                    self.status = match document::save_to_file(&self.file_path, &self.graph) {
                        Ok(()) => format!("Saved {}", self.file_path.display()),
                        Err(err) => err.to_string(),
                    };
                }
                if ui.button("Load").clicked() {
                    self.status = match document::load_from_file(&self.file_path, &self.registry) {
                        Ok(graph) => {
                            self.graph = graph;
                            format!("Loaded {}", self.file_path.display())
                        }
                        Err(err) => err.to_string(),
                    };
                }
            });
            ui.label(&self.status);
        });
    }

    fn node_windows(&mut self, ctx: &egui::Context) {
        let ids: Vec<NodeId> = self.graph.nodes.keys().copied().collect();
        for id in ids {
            let Some(node) = self.graph.nodes.get(&id) else {
                continue;
            };

            let mut changes = Vec::new();
            egui::Window::new(&node.title)
                .id(egui::Id::new(("node", id)))
                .default_pos(node.position)
                .resizable(false)
                .show(ctx, |ui| {
                    for port in &node.inputs {
                        ui.colored_label(port.data_type.color(), format!("▼ {}", port.name));
                    }
                    let mut layout = EguiLayout::new(ui);
                    match self.registry.draw_node(node, &mut layout) {
                        Ok(drawn) => changes = drawn,
                        Err(err) => {
                            ui.colored_label(egui::Color32::RED, err.to_string());
                        }
                    }
                    for port in &node.outputs {
                        ui.colored_label(port.data_type.color(), format!("▲ {}", port.name));
                    }
                });

            if changes.is_empty() {
                continue;
            }
            if let Some(node) = self.graph.nodes.get_mut(&id) {
                if let Err(err) = self.registry.apply_changes(node, changes) {
                    error!("{}", err);
                }
            }
        }
    }
}

impl eframe::App for NodeViewer {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.side_panel(ctx);
        egui::CentralPanel::default().show(ctx, |_ui| {});
        self.node_windows(ctx);
    }
}

/// Application entry point.
fn main() -> Result<(), eframe::Error> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default().with_inner_size([800.0, 600.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Nodle Function Nodes",
        options,
        Box::new(|_cc| Ok(Box::new(NodeViewer::new()))),
    )
}
