// main.rs: window, event loop and wiring between viewer, renderer and UI

#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")] // no console window in release builds

use catalog360::catalog::Catalog;
use catalog360::config::AppConfig;
use catalog360::i18n::{self, tr};
use catalog360::renderer::Renderer;
use catalog360::settings::Preferences;
use catalog360::texture::{request_background, TextureOutcome};
use catalog360::ui::{draw_ui, pick_image, wheel_delta_y, UiAction, UiState};
use catalog360::viewer::ViewerState;

use anyhow::Context;
use winit::{
    dpi::{LogicalSize, PhysicalPosition},
    event::*,
    event_loop::{ControlFlow, EventLoop},
    window::{Fullscreen, WindowBuilder},
};

use std::sync::mpsc::{channel, Receiver, Sender};
use std::sync::Arc;

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = AppConfig::from_env();
    i18n::init(config.lang.clone());

    let catalog = Catalog::load(&config.catalog).unwrap_or_else(|e| {
        log::error!("{e}");
        Catalog::default()
    });

    let event_loop = EventLoop::new();
    let window = Arc::new(
        WindowBuilder::new()
            .with_title(tr("app.title"))
            .with_inner_size(LogicalSize::new(1280, 720))
            .build(&event_loop)
            .context("cannot create window")?,
    );

    let mut renderer = pollster::block_on(Renderer::new(window.clone()))?;
    let mut viewer = ViewerState::new(renderer.size.width, renderer.size.height);
    viewer.init(&mut renderer);

    let (tx, rx): (Sender<TextureOutcome>, Receiver<TextureOutcome>) = channel();
    request_background(config.background.clone(), tx.clone());

    let mut ui_state = UiState::new(catalog, Preferences::load(), config.lang.clone());
    ui_state.is_loading = true;

    let mut cursor = PhysicalPosition::new(0.0f64, 0.0f64);

    event_loop.run(move |event, _, control_flow| {
        *control_flow = ControlFlow::Poll;

        if let Ok(outcome) = rx.try_recv() {
            viewer.apply_background(outcome, &mut renderer);
            ui_state.is_loading = false;
        }

        match event {
            Event::WindowEvent { event, .. } => {
                // a release always ends the drag, even over the UI
                if let WindowEvent::MouseInput { state: ElementState::Released, button: MouseButton::Left, .. } = event {
                    viewer.pointer_up();
                }

                let response = renderer.egui_state.on_event(&renderer.egui_ctx, &event);
                if response.consumed {
                    return;
                }

                match event {
                    WindowEvent::CloseRequested => {
                        *control_flow = ControlFlow::Exit;
                    }

                    WindowEvent::Resized(new_size) => {
                        renderer.resize(new_size);
                        viewer.resize(new_size.width, new_size.height, &mut renderer);
                    }

                    WindowEvent::ScaleFactorChanged { new_inner_size, .. } => {
                        renderer.resize(*new_inner_size);
                        viewer.resize(new_inner_size.width, new_inner_size.height, &mut renderer);
                    }

                    WindowEvent::KeyboardInput { input, .. } => {
                        if input.state == ElementState::Pressed {
                            match input.virtual_keycode {
                                Some(VirtualKeyCode::O) => {
                                    if let Some(path) = pick_image() {
                                        ui_state.is_loading = true;
                                        request_background(path, tx.clone());
                                    }
                                }
                                Some(VirtualKeyCode::F11) => {
                                    toggle_fullscreen(&window, &mut ui_state);
                                }
                                _ => {}
                            }
                        }
                    }

                    WindowEvent::MouseInput { state: ElementState::Pressed, button: MouseButton::Left, .. } => {
                        viewer.pointer_down(cursor.x as f32, cursor.y as f32);
                    }

                    WindowEvent::CursorMoved { position, .. } => {
                        cursor = position;
                        viewer.pointer_move(position.x as f32, position.y as f32);
                    }

                    WindowEvent::Touch(Touch { phase, location, .. }) => {
                        let (x, y) = (location.x as f32, location.y as f32);
                        match phase {
                            TouchPhase::Started => viewer.pointer_down(x, y),
                            TouchPhase::Moved => {
                                viewer.pointer_move(x, y);
                            }
                            TouchPhase::Ended | TouchPhase::Cancelled => viewer.pointer_up(),
                        }
                    }

                    WindowEvent::MouseWheel { delta, .. } => {
                        viewer.wheel(wheel_delta_y(&delta), &mut renderer);
                    }

                    WindowEvent::DroppedFile(path) => {
                        ui_state.is_loading = true;
                        request_background(path, tx.clone());
                    }

                    _ => {}
                }
            }

            Event::RedrawRequested(_) => {
                let mut actions = Vec::new();
                renderer.prepare_ui(|ctx| {
                    actions = draw_ui(ctx, &mut ui_state, &viewer.camera);
                });

                for action in actions {
                    match action {
                        UiAction::OpenBackground(path) => {
                            ui_state.is_loading = true;
                            request_background(path, tx.clone());
                        }
                        UiAction::ResetView => viewer.reset_view(&mut renderer),
                        UiAction::ToggleFullscreen => toggle_fullscreen(&window, &mut ui_state),
                        UiAction::LanguageChanged => window.set_title(&tr("app.title")),
                        UiAction::Exit => *control_flow = ControlFlow::Exit,
                    }
                }

                match viewer.frame(&mut renderer) {
                    Ok(_) => {}
                    Err(wgpu::SurfaceError::Lost) => renderer.resize(renderer.size),
                    Err(wgpu::SurfaceError::OutOfMemory) => *control_flow = ControlFlow::Exit,
                    Err(e) => log::error!("render error: {e:?}"),
                }
            }

            Event::MainEventsCleared => {
                window.request_redraw();
            }

            _ => {}
        }
    });
}

fn toggle_fullscreen(window: &winit::window::Window, ui_state: &mut UiState) {
    ui_state.is_fullscreen = !ui_state.is_fullscreen;
    if ui_state.is_fullscreen {
        window.set_fullscreen(Some(Fullscreen::Borderless(None)));
    } else {
        window.set_fullscreen(None);
    }
}
