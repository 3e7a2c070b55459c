#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")] // hide console window on Windows in release

use eframe::egui;
use egui_folder_tree::server::{FolderRecord, NodeKind, StoreResult};
use egui_folder_tree::{
    FolderDatabase, FolderTreeController, FolderTreeUi, LocalFolderApi, ProjectId,
};

const PROJECT: ProjectId = ProjectId(1);

fn seeded_database() -> StoreResult<FolderDatabase> {
    let db = FolderDatabase::open_in_memory()?;
    for (id, parent, name, order) in [
        (1, None, "Smoke", 0),
        (2, None, "Regression", 1),
        (3, Some(2), "Login", 0),
        (4, Some(2), "Checkout", 1),
        (5, Some(3), "OAuth", 0),
    ] {
        db.insert_folder(&FolderRecord::new(id, PROJECT, parent, name, order), None)?;
    }
    db.insert_test_case(egui_folder_tree::FolderId(3), "valid password")?;
    db.insert_test_case(egui_folder_tree::FolderId(3), "wrong password")?;

    // Pre-migration folders still living in the mixed table.
    db.insert_test_node(&FolderRecord::new(10, PROJECT, None, "Imported", 2), NodeKind::Folder)?;
    db.insert_test_node(&FolderRecord::new(11, PROJECT, Some(10), "Old suite", 0), NodeKind::Folder)?;
    db.insert_test_node(&FolderRecord::new(12, PROJECT, Some(10), "legacy case", 1), NodeKind::TestCase)?;
    Ok(db)
}

struct App {
    controller: FolderTreeController<LocalFolderApi>,
    tree_ui: FolderTreeUi,
    new_folder_name: String,
}

impl App {
    fn new(db: FolderDatabase) -> Self {
        let mut controller = FolderTreeController::new(LocalFolderApi::new(db), PROJECT);
        controller.refresh();
        Self {
            controller,
            tree_ui: FolderTreeUi::new("demo_tree"),
            new_folder_name: "New folder".to_owned(),
        }
    }
}

impl eframe::App for App {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        egui::SidePanel::left("folders")
            .default_width(280.0)
            .show(ctx, |ui| {
                ui.heading("Folders");
                ui.separator();
                let events = {
                    let (nodes, expanded) = self.controller.view_parts();
                    self.tree_ui.show(ui, nodes, expanded)
                };
                self.controller.handle_all(events);
            });

        egui::CentralPanel::default().show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.text_edit_singleline(&mut self.new_folder_name);
                if ui.button("Create").clicked() {
                    let parent = self.tree_ui.selected();
                    let name = self.new_folder_name.clone();
                    // Failures are already logged by the controller.
                    let _: Result<_, _> = self.controller.create_folder(parent, &name, None);
                }
                let selected = self.tree_ui.selected();
                if ui
                    .add_enabled(selected.is_some(), egui::Button::new("Delete selected"))
                    .clicked()
                {
                    if let Some(folder) = selected {
                        let _: Result<_, _> = self.controller.delete_folder(folder);
                        self.tree_ui.set_selected(None);
                    }
                }
            });

            if let Some(err) = self.controller.last_error() {
                ui.colored_label(ui.visuals().warn_fg_color, err.to_string());
            }
            ui.separator();

            ui.columns(2, |columns| {
                columns[0].label("Drag session");
                columns[0].code(self.tree_ui.session().debug_log().text());
                columns[1].label("Requests");
                columns[1].code(self.controller.debug_log().text());
            });
        });
    }
}

fn main() -> eframe::Result {
    env_logger::init();

    let db = match seeded_database() {
        Ok(db) => db,
        Err(err) => {
            log::error!("failed to seed the demo database: {err}");
            std::process::exit(1);
        }
    };

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1000.0, 700.0])
            .with_title("egui_folder_tree: demo"),
        ..Default::default()
    };
    eframe::run_native(
        "egui_folder_tree: demo",
        options,
        Box::new(|_cc| Ok(Box::new(App::new(db)))),
    )
}
