//! Node body drawing and parameter data
//!
//! Node types never talk to egui directly. They draw through [`NodeLayout`],
//! which the host implements over whatever surface it paints on.

use egui::{ComboBox, Ui};
use log::{debug, warn};
use serde::{Deserialize, Serialize};

use crate::nodes::property::PropertyDefinition;
use crate::nodes::Node;

/// Values stored in node parameters
///
/// Function nodes only declare enum properties, so an enum item identifier
/// is the only kind of value a document can hold.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum NodeData {
    /// Identifier of an enum item
    Enum(String),
}

impl NodeData {
    /// The enum identifier, if this is an enum value
    pub fn as_enum(&self) -> Option<&str> {
        match self {
            NodeData::Enum(identifier) => Some(identifier),
        }
    }
}

/// Parameter change notification
#[derive(Debug, Clone, PartialEq)]
pub struct ParameterChange {
    pub parameter: String,
    pub value: NodeData,
}

/// Drawing surface handed to a node's draw hook
pub trait NodeLayout {
    /// Draw a dropdown bound to an enum property. `text` replaces the property
    /// name as the widget label; an empty string draws no label.
    fn prop_enum(
        &mut self,
        node: &Node,
        property: &PropertyDefinition,
        text: &str,
    ) -> Option<ParameterChange>;

    /// Draw a plain text label
    fn label(&mut self, text: &str);
}

/// [`NodeLayout`] over an egui [`Ui`]
pub struct EguiLayout<'a> {
    ui: &'a mut Ui,
}

impl<'a> EguiLayout<'a> {
    pub fn new(ui: &'a mut Ui) -> Self {
        Self { ui }
    }
}

impl NodeLayout for EguiLayout<'_> {
    fn prop_enum(
        &mut self,
        node: &Node,
        property: &PropertyDefinition,
        text: &str,
    ) -> Option<ParameterChange> {
        let current = node
            .parameter(property.identifier)
            .and_then(NodeData::as_enum)
            .and_then(|identifier| property.item(identifier))
            .or_else(|| property.item(property.default));

        let mut selected = current.map(|item| item.identifier).unwrap_or(property.default);
        let selected_text = current.map(|item| item.name).unwrap_or(property.default);
        let mut change = None;

        let id_salt = (node.id, property.identifier);
        let combo = if text.is_empty() {
            ComboBox::from_id_salt(id_salt)
        } else {
            ComboBox::new(id_salt, text)
        };

        combo
            .selected_text(selected_text)
            .show_ui(self.ui, |ui| {
                for item in &property.items {
                    let response = ui.selectable_value(&mut selected, item.identifier, item.name);
                    if response.changed() {
                        change = Some(ParameterChange {
                            parameter: property.identifier.to_string(),
                            value: NodeData::Enum(item.identifier.to_string()),
                        });
                    }
                }
            });

        change
    }

    fn label(&mut self, text: &str) {
        self.ui.label(text);
    }
}

/// Apply changes to a node, rejecting any a property does not accept.
/// Returns the number of changes applied.
pub fn apply_changes(
    node: &mut Node,
    properties: &[PropertyDefinition],
    changes: Vec<ParameterChange>,
) -> usize {
    let mut applied = 0;

    for change in changes {
        match properties.iter().find(|p| p.identifier == change.parameter) {
            Some(property) if property.accepts(&change.value) => {
                debug!("Node {}: {} = {:?}", node.id, change.parameter, change.value);
                node.set_parameter(change.parameter, change.value);
                applied += 1;
            }
            Some(_) => {
                warn!(
                    "Node {}: rejected value {:?} for parameter '{}'",
                    node.id, change.value, change.parameter
                );
            }
            None => {
                warn!("Node {}: no parameter named '{}'", node.id, change.parameter);
            }
        }
    }

    applied
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::nodes::property::EnumItem;
    use egui::Pos2;

    fn blend_property() -> PropertyDefinition {
        PropertyDefinition {
            identifier: "blend",
            name: "Blend",
            items: vec![EnumItem::new("MIX", "Mix", 1), EnumItem::new("SCREEN", "Screen", 2)],
            default: "MIX",
        }
    }

    fn blend_node() -> Node {
        let mut node = Node::new(3, "test_BlendNode", "Blend", Pos2::ZERO);
        node.set_parameter("blend", NodeData::Enum("MIX".to_string()));
        node
    }

    fn change(parameter: &str, value: NodeData) -> ParameterChange {
        ParameterChange {
            parameter: parameter.to_string(),
            value,
        }
    }

    #[test]
    fn test_apply_legal_change() {
        let mut node = blend_node();
        let applied = apply_changes(
            &mut node,
            &[blend_property()],
            vec![change("blend", NodeData::Enum("SCREEN".to_string()))],
        );

        assert_eq!(applied, 1);
        assert_eq!(node.parameter("blend"), Some(&NodeData::Enum("SCREEN".to_string())));
    }

    #[test]
    fn test_reject_illegal_and_unknown_changes() {
        let mut node = blend_node();
        let applied = apply_changes(
            &mut node,
            &[blend_property()],
            vec![
                change("blend", NodeData::Enum("OVERLAY".to_string())),
                change("blend", NodeData::Enum("Screen".to_string())),
                change("opacity", NodeData::Enum("MIX".to_string())),
            ],
        );

        assert_eq!(applied, 0);
        assert_eq!(node.parameter("blend"), Some(&NodeData::Enum("MIX".to_string())));
        assert!(node.parameter("opacity").is_none());
    }

    #[test]
    fn test_egui_layout_draws_without_change() {
        let ctx = egui::Context::default();
        let node = blend_node();
        let property = blend_property();
        let mut changes = Vec::new();

        let _ = ctx.run(egui::RawInput::default(), |ctx| {
            egui::CentralPanel::default().show(ctx, |ui| {
                let mut layout = EguiLayout::new(ui);
                changes.extend(layout.prop_enum(&node, &property, ""));
                layout.label("Blend");
            });
        });

        assert!(changes.is_empty());
    }

    #[test]
    fn test_empty_text_draws_bare_combo_box() {
        let ctx = egui::Context::default();
        let node = blend_node();
        let property = blend_property();
        let mut widths = [0.0; 3];

        let _ = ctx.run(egui::RawInput::default(), |ctx| {
            egui::CentralPanel::default().show(ctx, |ui| {
                let bare = ui.horizontal(|ui| {
                    ComboBox::from_id_salt("bare").selected_text("Mix").show_ui(ui, |_| {});
                });
                let unlabelled = ui.horizontal(|ui| {
                    EguiLayout::new(ui).prop_enum(&node, &property, "");
                });
                let labelled = ui.horizontal(|ui| {
                    EguiLayout::new(ui).prop_enum(&node, &property, "Blend");
                });
                widths = [bare, unlabelled, labelled].map(|r| r.response.rect.width());
            });
        });

        assert!((widths[0] - widths[1]).abs() < 0.5);
        assert!(widths[2] > widths[1]);
    }
}
