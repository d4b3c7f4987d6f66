// ui.rs: menu bar, catalog tabs, product dialog and status bar

use std::path::PathBuf;

use winit::event::MouseScrollDelta;

use crate::catalog::{Catalog, CatalogEntry, ProductDialog, TabSelection};
use crate::format::{format_percent, format_price, format_usd, is_special_price, Price};
use crate::i18n::{tr, tr_with};
use crate::pricing::{Category, PriceBreakdown, PriceVariant};
use crate::settings::Preferences;
use crate::texture::{resolve_product_image, ProductImage};
use crate::viewer::CameraState;

/// Browser-style pixels per wheel notch.
pub const WHEEL_LINE_PIXELS: f32 = 100.0;

pub const IMAGE_EXTENSIONS: [&str; 4] = ["jpg", "jpeg", "png", "bmp"];
const SPECIAL_PRICE_COLOR: egui::Color32 = egui::Color32::from_rgb(0xe7, 0x4c, 0x3c);
const ACCENT_COLOR: egui::Color32 = egui::Color32::from_rgb(0xfd, 0x66, 0x00);
const PRODUCT_IMAGE_SIZE: egui::Vec2 = egui::vec2(400.0, 300.0);

/// Converts winit scroll input into a `deltaY` where positive widens the view.
pub fn wheel_delta_y(delta: &MouseScrollDelta) -> f32 {
    match delta {
        MouseScrollDelta::LineDelta(_, y) => -y * WHEEL_LINE_PIXELS,
        MouseScrollDelta::PixelDelta(pos) => -pos.y as f32,
    }
}

/// Work the UI asks the event loop to do after the frame.
#[derive(Debug, Clone, PartialEq)]
pub enum UiAction {
    OpenBackground(PathBuf),
    ResetView,
    ToggleFullscreen,
    LanguageChanged,
    Exit,
}

pub struct UiState {
    pub catalog: Catalog,
    pub tabs: TabSelection,
    pub dialog: ProductDialog,
    pub preferences: Preferences,
    pub lang: String,
    pub is_fullscreen: bool,
    pub is_loading: bool,
    product_image: Option<ProductImageSlot>,
}

/// Texture of the product currently shown in the dialog. `None` paints the
/// placeholder tile.
struct ProductImageSlot {
    key: String,
    texture: Option<egui::TextureHandle>,
}

impl UiState {
    pub fn new(catalog: Catalog, preferences: Preferences, lang: String) -> Self {
        let tabs = TabSelection::new(&catalog);
        Self {
            catalog,
            tabs,
            dialog: ProductDialog::default(),
            preferences,
            lang,
            is_fullscreen: false,
            is_loading: false,
            product_image: None,
        }
    }
}

pub fn pick_image() -> Option<PathBuf> {
    rfd::FileDialog::new()
        .add_filter(&tr("file.filter.images"), &IMAGE_EXTENSIONS)
        .pick_file()
}

pub fn draw_ui(ctx: &egui::Context, state: &mut UiState, camera: &CameraState) -> Vec<UiAction> {
    let mut actions = Vec::new();

    if state.dialog.is_open() && ctx.input(|i| i.key_pressed(egui::Key::Escape)) {
        state.dialog.close();
    }

    draw_menu_bar(ctx, state, &mut actions);
    draw_status_bar(ctx, state, camera);
    draw_catalog(ctx, state);
    draw_dialog(ctx, state);

    actions
}

fn draw_menu_bar(ctx: &egui::Context, state: &mut UiState, actions: &mut Vec<UiAction>) {
    egui::TopBottomPanel::top("menu_bar").show(ctx, |ui| {
        egui::menu::bar(ui, |ui| {
            ui.menu_button(tr("menu.file"), |ui| {
                if ui.button(tr("menu.open_image")).clicked() {
                    ui.close_menu();
                    if let Some(path) = pick_image() {
                        actions.push(UiAction::OpenBackground(path));
                    }
                }
                if ui.button(tr("menu.exit")).clicked() {
                    actions.push(UiAction::Exit);
                }
            });

            ui.menu_button(tr("menu.view"), |ui| {
                if ui.button(tr("view.reset")).clicked() {
                    actions.push(UiAction::ResetView);
                    ui.close_menu();
                }

                let fullscreen_label = if state.is_fullscreen {
                    tr("view.fullscreen.exit")
                } else {
                    tr("view.fullscreen.enter")
                };
                if ui.button(fullscreen_label).clicked() {
                    actions.push(UiAction::ToggleFullscreen);
                    ui.close_menu();
                }

                ui.separator();
                let mut internal = state.preferences.internal_mode;
                if ui.checkbox(&mut internal, tr("view.internal_mode")).changed() {
                    state.preferences.set_internal_mode(internal);
                }
            });

            ui.menu_button(tr("menu.language"), |ui| {
                for (code, name) in crate::i18n::LANGUAGES {
                    if ui.radio_value(&mut state.lang, code.to_string(), name).clicked() {
                        crate::i18n::init(state.lang.clone());
                        actions.push(UiAction::LanguageChanged);
                        ui.close_menu();
                    }
                }
            });
        });
    });
}

fn draw_status_bar(ctx: &egui::Context, state: &UiState, camera: &CameraState) {
    egui::TopBottomPanel::bottom("status_bar").show(ctx, |ui| {
        ui.horizontal(|ui| {
            if state.is_loading {
                ui.label(egui::RichText::new(tr("status.loading_image")).color(egui::Color32::YELLOW));
                ui.label("|");
            }
            ui.label(format!("Lon: {:.1}°", camera.longitude));
            ui.label("|");
            ui.label(format!("Lat: {:.1}°", camera.latitude));
            ui.label("|");
            ui.label(format!("FOV: {:.1}°", camera.field_of_view));

            if state.preferences.internal_mode {
                ui.label("|");
                ui.label(egui::RichText::new(tr("status.internal_mode")).color(ACCENT_COLOR));
            }
        });
    });
}

fn price_text(price: &Option<Price>) -> egui::RichText {
    let text = match price {
        Some(p) => format_price(p),
        None => tr("price.on_request"),
    };
    if is_special_price(&text) {
        egui::RichText::new(text).color(SPECIAL_PRICE_COLOR).italics()
    } else {
        egui::RichText::new(text).strong()
    }
}

fn draw_catalog(ctx: &egui::Context, state: &mut UiState) {
    let title = if state.catalog.title.is_empty() {
        tr("catalog.title")
    } else {
        state.catalog.title.clone()
    };

    let mut clicked: Option<CatalogEntry> = None;

    egui::Window::new(title)
        .id(egui::Id::new("catalog_window"))
        .default_width(640.0)
        .default_pos([24.0, 48.0])
        .show(ctx, |ui| {
            if state.catalog.tabs.is_empty() {
                ui.label(tr("catalog.empty"));
                return;
            }

            ui.horizontal_wrapped(|ui| {
                let mut selected: Option<String> = None;
                for tab in &state.catalog.tabs {
                    let active = state.tabs.active() == Some(tab.id.as_str());
                    if ui.selectable_label(active, tab.title.as_str()).clicked() {
                        selected = Some(tab.id.clone());
                    }
                }
                if let Some(id) = selected {
                    state.tabs.select(&state.catalog, &id);
                }
            });
            ui.separator();

            let Some(tab) = state.tabs.active_tab(&state.catalog) else {
                return;
            };

            egui::ScrollArea::vertical().max_height(420.0).show(ui, |ui| {
                egui::Grid::new(("products", tab.id.as_str()))
                    .num_columns(4)
                    .striped(true)
                    .spacing([16.0, 6.0])
                    .show(ui, |ui| {
                        ui.strong(tr("table.product"));
                        ui.strong(tr("table.power"));
                        ui.strong(tr("table.voltage"));
                        ui.strong(tr("table.price"));
                        ui.end_row();

                        for entry in &tab.products {
                            let row = ui
                                .add(egui::Label::new(entry.name.as_str()).sense(egui::Sense::click()))
                                .on_hover_text(tr("table.click_hint"));
                            ui.label(entry.power());
                            ui.label(entry.voltage());
                            ui.label(price_text(&entry.price));
                            ui.end_row();

                            if row.clicked() {
                                clicked = Some(entry.clone());
                            }
                        }
                    });
            });
        });

    if let Some(entry) = clicked {
        state.dialog.open(entry);
    }
}

fn discount_text(entry: &CatalogEntry, prices: &PriceBreakdown) -> String {
    let cash = prices.cash_discount.to_string();
    match entry.category {
        Category::GasResidencial => tr_with("dialog.discount.residential", &[("cash", cash)]),
        _ => tr_with(
            "dialog.discount.bonus",
            &[("bonus", prices.bonus.to_string()), ("cash", cash)],
        ),
    }
}

fn labelled(ui: &mut egui::Ui, key: &str, value: impl Into<egui::WidgetText>) {
    ui.label(egui::RichText::new(tr(key)).strong());
    ui.label(value);
    ui.end_row();
}

fn payment_option(ui: &mut egui::Ui, title_key: &str, variant: &PriceVariant, note: String) {
    ui.group(|ui| {
        ui.vertical(|ui| {
            ui.strong(tr(title_key));
            ui.label(format!("{} {}", tr("dialog.buy"), format_usd(variant.purchase)));
            ui.label(format!("{} {}", tr("dialog.sell"), format_usd(variant.sale)));
            ui.label(format!("{} {}", tr("dialog.profit"), format_usd(variant.profit_margin)));
            ui.small(note);
        });
    });
}

fn product_texture(ctx: &egui::Context, state: &mut UiState, entry: &CatalogEntry) -> Option<egui::TextureHandle> {
    let path = state.catalog.image_path(entry);
    let key = format!("{}|{}", entry.name, entry.image.as_deref().unwrap_or_default());

    if state.product_image.as_ref().map(|slot| slot.key.as_str()) != Some(key.as_str()) {
        let texture = match resolve_product_image(path.as_deref(), &entry.name) {
            ProductImage::Loaded(img) => {
                let size = [img.width() as usize, img.height() as usize];
                let pixels = egui::ColorImage::from_rgba_unmultiplied(size, img.as_raw());
                Some(ctx.load_texture(key.clone(), pixels, egui::TextureOptions::LINEAR))
            }
            ProductImage::Placeholder(_) => None,
        };
        state.product_image = Some(ProductImageSlot { key, texture });
    }

    state.product_image.as_ref().and_then(|slot| slot.texture.clone())
}

fn product_placeholder(ui: &mut egui::Ui, name: &str) {
    let (rect, _) = ui.allocate_exact_size(egui::vec2(PRODUCT_IMAGE_SIZE.x, 160.0), egui::Sense::hover());
    ui.painter().rect_filled(rect, 4.0, ACCENT_COLOR);
    ui.painter().text(
        rect.center(),
        egui::Align2::CENTER_CENTER,
        name,
        egui::FontId::proportional(20.0),
        egui::Color32::WHITE,
    );
}

fn draw_dialog(ctx: &egui::Context, state: &mut UiState) {
    let Some(entry) = state.dialog.entry().cloned() else {
        return;
    };
    let prices = state.dialog.prices().and_then(|p| p.as_ref().ok()).copied();
    let internal = state.preferences.internal_mode;
    let picture = product_texture(ctx, state, &entry);

    let mut open = true;
    egui::Window::new(entry.name.as_str())
        .id(egui::Id::new("product_dialog"))
        .open(&mut open)
        .collapsible(false)
        .resizable(false)
        .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
        .show(ctx, |ui| {
            ui.vertical_centered(|ui| match &picture {
                Some(texture) => {
                    ui.add(
                        egui::Image::new(egui::load::SizedTexture::from_handle(texture))
                            .max_size(PRODUCT_IMAGE_SIZE),
                    );
                }
                None => product_placeholder(ui, &entry.name),
            });
            ui.separator();

            egui::Grid::new("dialog_specs").num_columns(2).show(ui, |ui| {
                labelled(ui, "product.power", entry.power());
                labelled(ui, "product.voltage", entry.voltage());
                labelled(ui, "product.motor", entry.motor());
                labelled(ui, "product.start", entry.start());
                labelled(ui, "product.weight", entry.weight());
            });
            ui.separator();

            let Some(prices) = prices else {
                ui.horizontal(|ui| {
                    ui.strong(tr("dialog.public_price"));
                    ui.label(price_text(&entry.price));
                });
                return;
            };

            egui::Grid::new("dialog_public").num_columns(2).show(ui, |ui| {
                labelled(
                    ui,
                    "dialog.public_price",
                    egui::RichText::new(format_usd(prices.public_price())).color(ACCENT_COLOR).heading(),
                );
                labelled(ui, "dialog.list_price", format_usd(prices.list_price));
                labelled(ui, "dialog.iva_amount", format_usd(prices.iva_amount()));
                labelled(
                    ui,
                    "dialog.iva_info",
                    tr_with("dialog.iva_of_base", &[("rate", prices.iva_rate.to_string())]),
                );
            });

            if internal {
                ui.separator();
                egui::Grid::new("dialog_costs").num_columns(2).show(ui, |ui| {
                    labelled(ui, "dialog.purchase_price", format_usd(prices.cash.purchase));
                    labelled(ui, "dialog.discount", discount_text(&entry, &prices));
                    labelled(ui, "dialog.profit_margin", format_usd(prices.cash.profit_margin));
                    labelled(
                        ui,
                        "dialog.profit_percent",
                        tr_with(
                            "dialog.profit_percent_value",
                            &[("percent", format_percent(prices.cash.profit_percent))],
                        ),
                    );
                });

                ui.horizontal(|ui| {
                    payment_option(
                        ui,
                        "dialog.cash_option",
                        &prices.cash,
                        tr_with(
                            "dialog.cash_note",
                            &[
                                ("bonus", prices.bonus.to_string()),
                                ("cash", prices.cash_discount.to_string()),
                            ],
                        ),
                    );
                    payment_option(
                        ui,
                        "dialog.financed_option",
                        &prices.financed,
                        tr_with("dialog.financed_note", &[("bonus", prices.bonus.to_string())]),
                    );
                });
            }

            ui.separator();
            egui::Grid::new("dialog_details").num_columns(2).show(ui, |ui| {
                labelled(ui, "detail.iva_type", format!("{}%", prices.iva_rate));
                labelled(ui, "detail.dollar_type", entry.dollar_type());
                labelled(ui, "detail.fuel", entry.fuel());
                labelled(ui, "detail.soundproof", entry.soundproof());
                labelled(ui, "detail.cabin", entry.cabin());
                labelled(ui, "detail.control_panel", entry.control_panel());
                labelled(ui, "detail.accessories", entry.accessories());
                labelled(ui, "detail.warranty", entry.warranty());
                labelled(ui, "detail.financing", entry.financing());
            });
        });

    if !open {
        state.dialog.close();
    }
}
