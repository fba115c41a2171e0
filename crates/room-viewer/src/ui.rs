//! egui overlay: what the pointer is over, and the controls.

/// What the HUD shows about the pointer target.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum HoverInfo {
    #[default]
    Nothing,
    Link { label: String, url: String },
    Laptop { open: bool },
}

pub fn draw_hud(ctx: &egui::Context, hover: &HoverInfo, lid_open: bool, chair_spinning: bool) {
    egui::Area::new(egui::Id::new("room_hud"))
        .anchor(egui::Align2::LEFT_TOP, [12.0, 12.0])
        .interactable(false)
        .show(ctx, |ui| {
            egui::Frame::popup(ui.style()).show(ui, |ui| {
                ui.heading("Portfolio Room");
                ui.separator();
                match hover {
                    HoverInfo::Nothing => {
                        ui.label("Point at a frame, card or the laptop.");
                    }
                    HoverInfo::Link { label, url } => {
                        ui.label(egui::RichText::new(label).strong());
                        ui.monospace(url);
                        ui.small("Click to open in your browser");
                    }
                    HoverInfo::Laptop { open } => {
                        ui.label(egui::RichText::new("Laptop").strong());
                        ui.small(if *open { "Click to close" } else { "Click to open" });
                    }
                }
                ui.separator();
                ui.small(format!(
                    "Lid: {} | Chair: {}",
                    if lid_open { "open" } else { "closed" },
                    if chair_spinning { "spinning" } else { "still" }
                ));
                ui.small("Drag: orbit | Wheel: zoom | Esc: quit");
            });
        });
}
