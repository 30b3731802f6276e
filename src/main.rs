use std::path::Path;
use std::time::Duration;

use iced::widget::{button, column, container, row, text, text_input, Column};
use iced::{Alignment, Element, Length, Subscription, Task, Theme};
use rfd::{FileDialog, MessageButtons, MessageDialog, MessageDialogResult, MessageLevel};

use crate::camera::CameraAdapter;
use crate::error::AppError;
use crate::imaging::filter::FilterKind;
use crate::imaging::{filter, thumbnail};
use crate::session::Session;
use crate::upload::{BucketConfig, Uploader};

// Declare the application modules
mod camera;
mod error;
mod imaging;
mod logging;
mod session;
mod upload;

/// Cadence of the preview loop while previewing
const PREVIEW_INTERVAL_MS: u64 = 100;

/// A filter the user previewed and may still apply or discard
#[derive(Debug)]
struct PendingFilter {
    kind: FilterKind,
    image: image::DynamicImage,
}

/// In-window filter prompt (name entry, then preview + confirm)
#[derive(Debug, Default)]
struct FilterPrompt {
    name_input: String,
    pending: Option<PendingFilter>,
}

/// Settings panel state. Brightness and contrast are collected and
/// echoed back only; no adjustment is applied to images yet.
#[derive(Debug, Default)]
struct SettingsForm {
    brightness: String,
    contrast: String,
}

/// Main application state
struct CameraApp {
    /// Pipeline state: preview flag, captured image reference, uploads
    session: Session,
    /// Camera device; None when opening it failed at startup
    camera: Option<CameraAdapter>,
    /// Cloud uploader; None when the credential file was missing or bad
    uploader: Option<Uploader>,
    /// Status line shown under the buttons
    status: String,
    /// Latest preview frame, rendered while previewing
    preview_frame: Option<iced::widget::image::Handle>,
    /// Thumbnail of the last saved or filter-previewed image
    thumbnail: Option<iced::widget::image::Handle>,
    /// Filter prompt, when open
    filter_prompt: Option<FilterPrompt>,
    /// Settings panel, when open
    settings: Option<SettingsForm>,
}

/// Application messages (events)
#[derive(Debug, Clone)]
enum Message {
    /// Start/stop the preview loop
    TogglePreview,
    /// Timer tick while previewing
    PreviewTick,
    /// Capture a still image
    Capture,
    /// Open the filter name prompt
    OpenFilterPrompt,
    FilterNameChanged(String),
    /// Parse the typed name and render a preview of the transform
    PreviewFilter,
    /// Persist the previewed filter result
    ConfirmFilter,
    CancelFilter,
    ToggleSettings,
    BrightnessChanged(String),
    ContrastChanged(String),
    SaveSettings,
    /// Background upload finished (object key on success)
    UploadFinished(Result<String, AppError>),
    Quit,
}

impl CameraApp {
    fn new() -> (Self, Task<Message>) {
        // Camera failure degrades preview and capture instead of exiting
        let camera = match CameraAdapter::open(0).and_then(|mut cam| {
            cam.start()?;
            Ok(cam)
        }) {
            Ok(cam) => Some(cam),
            Err(e) => {
                log::error!("Failed to initialize camera: {}", e);
                show_error("Camera Error", &e.to_string());
                None
            }
        };

        // Cloud setup failure degrades the upload feature the same way
        let uploader = match BucketConfig::load() {
            Ok(config) => {
                log::info!("Cloud storage initialized (bucket {})", config.bucket);
                Some(Uploader::new(config))
            }
            Err(e) => {
                log::error!("Failed to initialize cloud storage: {}", e);
                show_error("Cloud Storage Error", &e.to_string());
                None
            }
        };

        let status = match (&camera, &uploader) {
            (Some(_), Some(_)) => "Ready.".to_string(),
            (None, _) => "Ready (camera unavailable).".to_string(),
            (_, None) => "Ready (uploads disabled).".to_string(),
        };

        (
            CameraApp {
                session: Session::new(),
                camera,
                uploader,
                status,
                preview_frame: None,
                thumbnail: None,
                filter_prompt: None,
                settings: None,
            },
            Task::none(),
        )
    }

    /// Handle application messages and update state
    fn update(&mut self, message: Message) -> Task<Message> {
        match message {
            Message::TogglePreview => {
                if self.camera.is_none() {
                    self.report("Preview", &AppError::Device("no camera available".into()));
                    return Task::none();
                }
                if !self.session.toggle_preview() {
                    // Clearing the flag removes the tick subscription; no
                    // residual frame callbacks remain scheduled
                    self.preview_frame = None;
                }
                Task::none()
            }

            Message::PreviewTick => {
                // A tick can arrive just after preview was stopped
                if !self.session.previewing() {
                    return Task::none();
                }
                let Some(camera) = self.camera.as_mut() else {
                    return Task::none();
                };
                match camera.capture_frame() {
                    Ok(frame) => {
                        let fitted = thumbnail::fit(&frame, thumbnail::PREVIEW_MAX);
                        self.preview_frame = Some(thumbnail::to_handle(&fitted));
                    }
                    Err(e) => {
                        // One failed fetch stops the loop; the next toggle
                        // starts it fresh
                        self.session.stop_preview();
                        self.preview_frame = None;
                        self.report("Preview", &e);
                    }
                }
                Task::none()
            }

            Message::Capture => self.capture_image(),

            Message::OpenFilterPrompt => {
                if let Err(e) = self.session.require_captured() {
                    self.report("No Image", &e);
                    return Task::none();
                }
                self.filter_prompt = Some(FilterPrompt::default());
                Task::none()
            }

            Message::FilterNameChanged(name) => {
                if let Some(prompt) = self.filter_prompt.as_mut() {
                    prompt.name_input = name;
                }
                Task::none()
            }

            Message::PreviewFilter => self.preview_filter(),

            Message::ConfirmFilter => self.confirm_filter(),

            Message::CancelFilter => {
                self.filter_prompt = None;
                Task::none()
            }

            Message::ToggleSettings => {
                self.settings = match self.settings {
                    Some(_) => None,
                    None => Some(SettingsForm::default()),
                };
                Task::none()
            }

            Message::BrightnessChanged(value) => {
                if let Some(settings) = self.settings.as_mut() {
                    settings.brightness = value;
                }
                Task::none()
            }

            Message::ContrastChanged(value) => {
                if let Some(settings) = self.settings.as_mut() {
                    settings.contrast = value;
                }
                Task::none()
            }

            Message::SaveSettings => {
                if let Some(settings) = &self.settings {
                    // Placeholder: values are echoed back, not applied
                    let summary = format!(
                        "Brightness: {}\nContrast: {}",
                        settings.brightness, settings.contrast
                    );
                    log::info!("Settings saved: {}", summary.replace('\n', ", "));
                    MessageDialog::new()
                        .set_level(MessageLevel::Info)
                        .set_title("Settings Saved")
                        .set_description(summary)
                        .show();
                }
                Task::none()
            }

            Message::UploadFinished(result) => {
                self.session.upload_finished();
                match result {
                    Ok(key) => {
                        self.status = format!("Image uploaded as {}", key);
                        log::info!("Image uploaded as {}", key);
                    }
                    // The locally saved file is retained regardless
                    Err(e) => self.report("Upload", &e),
                }
                Task::none()
            }

            Message::Quit => {
                let confirmed = MessageDialog::new()
                    .set_level(MessageLevel::Warning)
                    .set_title("Quit")
                    .set_description("Do you really want to quit?")
                    .set_buttons(MessageButtons::OkCancel)
                    .show();
                if confirmed == MessageDialogResult::Ok {
                    if let Some(camera) = self.camera.as_mut() {
                        camera.stop();
                    }
                    log::info!("Shutting down");
                    return iced::exit();
                }
                Task::none()
            }
        }
    }

    /// Capture a frame, prompt for a path, save, display, and dispatch
    /// the upload. Failures are reported at each step; partial effects
    /// (an already-saved file) are not rolled back.
    fn capture_image(&mut self) -> Task<Message> {
        let Some(camera) = self.camera.as_mut() else {
            self.report("Capture", &AppError::Device("no camera available".into()));
            return Task::none();
        };

        self.status = "Capturing image...".to_string();
        let frame = match camera.capture_frame() {
            Ok(frame) => frame,
            Err(e) => {
                self.report("Capture", &e);
                return Task::none();
            }
        };

        let chosen = FileDialog::new()
            .add_filter("JPEG image", &["jpg"])
            .set_file_name(default_capture_name())
            .save_file();
        let Some(path) = chosen else {
            // Cancelled dialog: nothing saved, reference unchanged
            self.status = "Capture cancelled.".to_string();
            return Task::none();
        };
        let path = imaging::ensure_jpg_extension(path);

        if let Err(e) = imaging::save_jpeg(&frame, &path) {
            self.report("Capture", &e);
            return Task::none();
        }
        self.session.record_capture(path.clone());

        let basename = basename_of(&path);
        self.status = format!("Image saved as {}", basename);
        log::info!("Image saved as {}", basename);

        self.show_saved_thumbnail(&path);

        if let Some(uploader) = self.uploader.clone() {
            self.session.upload_started();
            return Task::perform(
                async move { uploader.upload(path).await },
                Message::UploadFinished,
            );
        }
        log::warn!("Upload skipped: cloud storage not configured");
        Task::none()
    }

    /// Re-open the last saved image, run the typed filter over it, and
    /// render the result for confirmation
    fn preview_filter(&mut self) -> Task<Message> {
        let Some(prompt) = self.filter_prompt.as_ref() else {
            return Task::none();
        };

        let kind = match prompt.name_input.parse::<FilterKind>() {
            Ok(kind) => kind,
            Err(e) => {
                self.report("Invalid Filter", &e);
                return Task::none();
            }
        };

        let path = match self.session.require_captured() {
            Ok(path) => path.to_path_buf(),
            Err(e) => {
                self.report("No Image", &e);
                return Task::none();
            }
        };
        let source = match image::open(&path) {
            Ok(img) => img,
            Err(e) => {
                self.report("Apply Filter", &AppError::from(e));
                return Task::none();
            }
        };

        let filtered = filter::apply(&source, kind);
        let preview = thumbnail::fit(&filtered, thumbnail::THUMBNAIL_MAX);
        self.thumbnail = Some(thumbnail::to_handle(&preview));
        self.status = format!("Previewing {} filter. Apply?", kind);

        if let Some(prompt) = self.filter_prompt.as_mut() {
            prompt.pending = Some(PendingFilter {
                kind,
                image: filtered,
            });
        }
        Task::none()
    }

    /// Persist the previewed filter result and make it the new captured
    /// image reference
    fn confirm_filter(&mut self) -> Task<Message> {
        let Some(pending) = self.filter_prompt.as_mut().and_then(|p| p.pending.take()) else {
            return Task::none();
        };

        let chosen = FileDialog::new()
            .add_filter("JPEG image", &["jpg"])
            .set_file_name(default_capture_name())
            .save_file();
        let Some(path) = chosen else {
            // Cancelled: reference unchanged, prompt closes
            self.filter_prompt = None;
            return Task::none();
        };
        let path = imaging::ensure_jpg_extension(path);

        match imaging::save_jpeg(&pending.image, &path) {
            Ok(()) => {
                self.session.record_capture(path.clone());
                self.show_saved_thumbnail(&path);
                self.status = format!("Image saved with {} filter.", pending.kind);
                log::info!("Image saved with {} filter.", pending.kind);
            }
            Err(e) => self.report("Apply Filter", &e),
        }
        self.filter_prompt = None;
        Task::none()
    }

    /// Display a saved image as a thumbnail. A display failure is logged
    /// and shown but the saved file stays on disk.
    fn show_saved_thumbnail(&mut self, path: &Path) {
        match image::open(path) {
            Ok(img) => {
                let thumb = thumbnail::fit(&img, thumbnail::THUMBNAIL_MAX);
                self.thumbnail = Some(thumbnail::to_handle(&thumb));
            }
            Err(e) => {
                let e = AppError::from(e);
                log::error!("Error displaying image: {}", e);
                self.status = format!("Error displaying image: {}", e);
            }
        }
    }

    /// Log an error, surface it modally, and mirror it in the status line
    fn report(&mut self, context: &str, error: &AppError) {
        log::error!("{}: {}", context, error);
        self.status = format!("Error: {}", error);
        show_error(context, &error.to_string());
    }

    /// Preview ticks come from a cancellable timer subscription: clearing
    /// the preview flag drops the subscription, so no callback outlives a
    /// stopped preview.
    fn subscription(&self) -> Subscription<Message> {
        if self.session.previewing() {
            iced::time::every(Duration::from_millis(PREVIEW_INTERVAL_MS))
                .map(|_| Message::PreviewTick)
        } else {
            Subscription::none()
        }
    }

    /// Build the user interface
    fn view(&self) -> Element<Message> {
        let preview_label = if self.session.previewing() {
            "Stop Preview"
        } else {
            "Start Preview"
        };

        let mut content: Column<Message> = column![
            text("Raspberry Pi Camera Control").size(28),
            row![
                button(preview_label).on_press(Message::TogglePreview).padding(10),
                button("Capture Image").on_press(Message::Capture).padding(10),
            ]
            .spacing(10),
            row![
                button("Apply Filter").on_press(Message::OpenFilterPrompt).padding(10),
                button("Settings").on_press(Message::ToggleSettings).padding(10),
            ]
            .spacing(10),
            button("Quit").on_press(Message::Quit).padding(10),
            text(&self.status).size(16),
        ]
        .spacing(15)
        .padding(30)
        .align_x(Alignment::Center);

        if self.session.uploading() {
            content = content.push(
                text(format!(
                    "Uploading {} image(s)...",
                    self.session.uploads_in_flight()
                ))
                .size(14),
            );
        }

        if let Some(prompt) = &self.filter_prompt {
            content = content.push(filter_prompt_view(prompt));
        }

        if let Some(settings) = &self.settings {
            content = content.push(settings_view(settings));
        }

        if let Some(handle) = &self.thumbnail {
            content = content.push(iced::widget::image(handle.clone()));
        }

        let preview: Element<Message> = match &self.preview_frame {
            Some(handle) => iced::widget::image(handle.clone()).into(),
            None => container(text("Preview off").size(14))
                .center_x(Length::Fixed(640.0))
                .center_y(Length::Fixed(480.0))
                .into(),
        };
        content = content.push(preview);

        container(content.width(Length::Fill))
            .width(Length::Fill)
            .height(Length::Fill)
            .center_x(Length::Fill)
            .into()
    }

    /// Set the application theme
    fn theme(&self) -> Theme {
        Theme::Dark
    }
}

fn filter_prompt_view(prompt: &FilterPrompt) -> Element<'_, Message> {
    let controls = if prompt.pending.is_some() {
        row![
            button("Apply").on_press(Message::ConfirmFilter).padding(8),
            button("Cancel").on_press(Message::CancelFilter).padding(8),
        ]
        .spacing(10)
    } else {
        row![
            button("Preview").on_press(Message::PreviewFilter).padding(8),
            button("Cancel").on_press(Message::CancelFilter).padding(8),
        ]
        .spacing(10)
    };

    column![
        text("Enter filter: grayscale, sepia, invert, blur, sharpen, edge").size(14),
        text_input("filter name", &prompt.name_input)
            .on_input(Message::FilterNameChanged)
            .on_submit(Message::PreviewFilter)
            .padding(8),
        controls,
    ]
    .spacing(8)
    .align_x(Alignment::Center)
    .into()
}

fn settings_view(settings: &SettingsForm) -> Element<'_, Message> {
    column![
        text("Brightness (0-100):").size(14),
        text_input("brightness", &settings.brightness)
            .on_input(Message::BrightnessChanged)
            .padding(8),
        text("Contrast (0-100):").size(14),
        text_input("contrast", &settings.contrast)
            .on_input(Message::ContrastChanged)
            .padding(8),
        button("Save Settings").on_press(Message::SaveSettings).padding(8),
    ]
    .spacing(8)
    .align_x(Alignment::Center)
    .into()
}

/// Timestamped default name offered by the save dialog
fn default_capture_name() -> String {
    format!(
        "capture_{}.jpg",
        chrono::Local::now().format("%Y%m%d_%H%M%S")
    )
}

fn basename_of(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// Modal error notification
fn show_error(title: &str, description: &str) {
    MessageDialog::new()
        .set_level(MessageLevel::Error)
        .set_title(title)
        .set_description(description)
        .show();
}

fn main() -> iced::Result {
    logging::init();
    log::info!("picam-studio starting");

    iced::application("Raspberry Pi Camera", CameraApp::update, CameraApp::view)
        .subscription(CameraApp::subscription)
        .theme(CameraApp::theme)
        .window_size(iced::Size::new(800.0, 1000.0))
        .centered()
        .run_with(CameraApp::new)
}
