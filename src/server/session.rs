//! One task per page session.
//!
//! The task owns the session's [`GenerationController`]; handlers talk to it
//! over a channel, so every event for a session runs on that one task in
//! arrival order. The task also sleeps until the controller's next timer
//! deadline and polls it, which is what drives the text debounce and the
//! delayed success message. Dropping every [`SessionHandle`] ends the task.
//!
//! Rendering and logo decoding are CPU bound, so each unit of controller
//! work runs on the blocking pool. The controller moves there and back, and
//! the task waits for it before taking the next command.

use std::time::Instant;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, error};

use crate::controller::{GenerationController, UiEvent};
use crate::engine::{ExportedFile, RasterEngine};
use crate::page::{PageSnapshot, PageState};

type Controller = GenerationController<RasterEngine, PageState>;

const CHANNEL_CAPACITY: usize = 32;

enum Command {
    Event(UiEvent, oneshot::Sender<PageSnapshot>),
    Snapshot(oneshot::Sender<PageSnapshot>),
    Preview(oneshot::Sender<Option<ExportedFile>>),
    Download(oneshot::Sender<(PageSnapshot, Option<ExportedFile>)>),
}

/// The session task stopped (expired or crashed).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionClosed;

#[derive(Debug, Clone)]
pub struct SessionHandle {
    tx: mpsc::Sender<Command>,
}

impl SessionHandle {
    /// Spawn the task driving `controller`.
    pub fn spawn(controller: Controller) -> Self {
        let (tx, rx) = mpsc::channel(CHANNEL_CAPACITY);
        tokio::spawn(run(controller, rx));
        Self { tx }
    }

    /// A handle whose task is already gone.
    #[cfg(test)]
    pub fn closed() -> Self {
        let (tx, _) = mpsc::channel(1);
        Self { tx }
    }

    async fn request<T>(
        &self,
        command: impl FnOnce(oneshot::Sender<T>) -> Command,
    ) -> Result<T, SessionClosed> {
        let (reply, rx) = oneshot::channel();
        self.tx.send(command(reply)).await.map_err(|_| SessionClosed)?;
        rx.await.map_err(|_| SessionClosed)
    }

    /// Apply an event and return the page afterwards.
    pub async fn dispatch(&self, event: UiEvent) -> Result<PageSnapshot, SessionClosed> {
        self.request(|reply| Command::Event(event, reply)).await
    }

    pub async fn snapshot(&self) -> Result<PageSnapshot, SessionClosed> {
        self.request(Command::Snapshot).await
    }

    /// The currently mounted render.
    pub async fn preview(&self) -> Result<Option<ExportedFile>, SessionClosed> {
        self.request(Command::Preview).await
    }

    /// Click download; returns the page and the exported file, if any.
    pub async fn download(
        &self,
    ) -> Result<(PageSnapshot, Option<ExportedFile>), SessionClosed> {
        self.request(Command::Download).await
    }
}

/// Snapshot the page and hand its notifications over exactly once.
fn deliver(controller: &mut Controller) -> PageSnapshot {
    let snapshot = controller.surface().snapshot();
    controller.surface_mut().take_notifications();
    snapshot
}

/// What the task does next.
enum Work {
    Command(Command),
    Poll,
}

async fn run(mut controller: Controller, mut rx: mpsc::Receiver<Command>) {
    loop {
        let deadline = controller.next_deadline();
        let wake = tokio::time::Instant::from_std(deadline.unwrap_or_else(Instant::now));

        let work = tokio::select! {
            command = rx.recv() => match command {
                Some(command) => Work::Command(command),
                None => break,
            },
            _ = tokio::time::sleep_until(wake), if deadline.is_some() => Work::Poll,
        };

        let result = tokio::task::spawn_blocking(move || {
            match work {
                Work::Command(command) => handle(&mut controller, command),
                Work::Poll => controller.poll(Instant::now()),
            }
            controller
        })
        .await;

        controller = match result {
            Ok(controller) => controller,
            Err(e) => {
                error!(error = %e, "session controller panicked");
                break;
            }
        };
    }
    debug!("session task finished");
}

fn handle(controller: &mut Controller, command: Command) {
    // replies are dropped if the requester went away
    match command {
        Command::Event(event, reply) => {
            controller.handle(event, Instant::now());
            let _ = reply.send(deliver(controller));
        }
        Command::Snapshot(reply) => {
            let _ = reply.send(deliver(controller));
        }
        Command::Preview(reply) => {
            let _ = reply.send(controller.surface().preview.content().cloned());
        }
        Command::Download(reply) => {
            controller.handle(UiEvent::DownloadClicked, Instant::now());
            let file = controller.surface_mut().take_saved();
            // a file response carries no page, so keep notifications for the next snapshot
            let page = match file {
                Some(_) => controller.surface().snapshot(),
                None => deliver(controller),
            };
            let _ = reply.send((page, file));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GeneratorConfig;

    fn spawn() -> SessionHandle {
        SessionHandle::spawn(GenerationController::with_raster(GeneratorConfig::default()).unwrap())
    }

    #[tokio::test]
    async fn test_events_update_snapshot() {
        let session = spawn();
        let page = session.snapshot().await.unwrap();
        assert_eq!(page.status, "Ready to generate");
        assert!(page.has_preview);

        let page = session
            .dispatch(UiEvent::StyleSelected("dots".into()))
            .await
            .unwrap();
        let active: Vec<_> = page.styles.iter().filter(|b| b.active).collect();
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].id, "dots");
    }

    #[tokio::test]
    async fn test_notifications_delivered_once() {
        let session = spawn();
        let page = session
            .dispatch(UiEvent::LogoSelected(crate::logo::LogoFile::new(
                "notes.txt",
                "text/plain",
                vec![1],
            )))
            .await
            .unwrap();
        assert_eq!(page.notifications.len(), 1);
        assert!(session.snapshot().await.unwrap().notifications.is_empty());
    }

    #[tokio::test]
    async fn test_download_returns_file() {
        let session = spawn();
        let (page, file) = session.download().await.unwrap();
        let file = file.unwrap();
        assert!(file.file_name.starts_with("qr-code-square-"));
        assert!(file.file_name.ends_with(".png"));
        assert_eq!(page.notifications[0].message, "QR code downloaded successfully!");
    }

    #[tokio::test]
    async fn test_success_timer_fires() {
        let session = spawn();
        let page = session.dispatch(UiEvent::GenerateClicked).await.unwrap();
        assert_eq!(page.status, "Generating...");

        tokio::time::sleep(std::time::Duration::from_millis(700)).await;
        let page = session.snapshot().await.unwrap();
        assert_eq!(page.status, "QR Code Generated!");
        assert!(page.download_visible);
    }

    #[tokio::test]
    async fn test_rendering_runs_off_the_runtime_thread() {
        use image::{DynamicImage, ImageFormat, Rgba, RgbaImage};
        use std::io::Cursor;

        let busy = spawn();
        let idle = spawn();
        busy.dispatch(UiEvent::TextInput("https://example.com".into()))
            .await
            .unwrap();

        // large enough that decoding and scaling it takes a while
        let mut logo = Cursor::new(Vec::new());
        DynamicImage::ImageRgba8(RgbaImage::from_pixel(3000, 3000, Rgba([255, 0, 0, 255])))
            .write_to(&mut logo, ImageFormat::Png)
            .unwrap();
        let logo = crate::logo::LogoFile::new("big.png", "image/png", logo.into_inner());

        // the test runtime has a single thread, so the idle session can only
        // answer first if the busy one is not rendering on it
        let (busy_done, idle_done) = tokio::join!(
            async {
                let page = busy.dispatch(UiEvent::LogoSelected(logo)).await.unwrap();
                assert_eq!(page.notifications[0].message, "Logo uploaded successfully");
                Instant::now()
            },
            async {
                tokio::task::yield_now().await;
                idle.snapshot().await.unwrap();
                Instant::now()
            },
        );
        assert!(idle_done < busy_done);
    }
}
