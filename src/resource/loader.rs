//! 异步加载器
//!
//! 加载器在多个帧内产出资源数据。容器在 `load` 时调用一次 `start`，
//! 之后每帧调用一次 `continue_loading`，直到返回值不再是 `Pending`。
//!
//! 容器自身只在拥有它的线程上运行，跨线程交付由加载器负责：
//! `ChannelLoader` 通过 crossbeam 通道从任意线程接收数据，
//! `ThreadedLoader` 在独立的命名线程上运行加载任务。

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use crossbeam_channel::{Receiver, Sender, TryRecvError};

use super::container::ResourceContainer;
use super::factory::{AsyncResource, GfxResource, ResourceSetup};
use super::id::Id;
use super::locator::Locator;
use super::state::ResourceState;
use crate::core::error::LoadError;
use crate::{resource_debug, resource_error, resource_warn};

/// 加载器契约
pub trait ResourceLoader {
    /// 要加载的资源的定位符
    fn locator(&self) -> &Locator;

    /// 开始加载，返回资源句柄
    fn start(&mut self, container: &mut ResourceContainer) -> Id;

    /// 推进一步
    fn continue_loading(&mut self, container: &mut ResourceContainer) -> ResourceState;

    /// 容器销毁时取消加载
    fn cancel(&mut self);
}

/// 加载结果
enum LoadMessage<R: GfxResource> {
    Complete {
        /// 加载过程中得到的最终创建参数（例如解码后才知道的纹理尺寸）
        setup: Option<R::Setup>,
        data: Vec<u8>,
    },
    Failed(LoadError),
}

/// 向 `ChannelLoader` 交付结果的一端，可以移动到任意线程
pub struct LoadSender<R: GfxResource> {
    sender: Sender<LoadMessage<R>>,
    cancelled: Arc<AtomicBool>,
}

impl<R: GfxResource> LoadSender<R> {
    /// 交付数据
    ///
    /// 加载已被取消时返回 `LoadError::Cancelled`，接收端已释放时返回 `LoadError::Disconnected`。
    pub fn complete(self, data: Vec<u8>) -> Result<(), LoadError> {
        self.deliver(LoadMessage::Complete { setup: None, data })
    }

    /// 交付数据和更新后的创建参数
    pub fn complete_with(self, setup: R::Setup, data: Vec<u8>) -> Result<(), LoadError> {
        self.deliver(LoadMessage::Complete { setup: Some(setup), data })
    }

    /// 报告加载失败
    pub fn fail(self, error: LoadError) -> Result<(), LoadError> {
        self.deliver(LoadMessage::Failed(error))
    }

    /// 加载是否已被取消
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }

    fn deliver(self, message: LoadMessage<R>) -> Result<(), LoadError> {
        if self.is_cancelled() {
            return Err(LoadError::Cancelled);
        }
        self.sender.send(message).map_err(|_| LoadError::Disconnected)
    }
}

/// 通过通道接收数据的加载器
///
/// `start` 时以 `prepare_async` 预留槽位，收到数据后调用 `init_async`，
/// 收到失败或发送端断开时调用 `failed_async`。
pub struct ChannelLoader<R: AsyncResource> {
    setup: R::Setup,
    id: Id,
    receiver: Receiver<LoadMessage<R>>,
    cancelled: Arc<AtomicBool>,
}

impl<R: AsyncResource> ChannelLoader<R> {
    /// 创建加载器和对应的发送端
    pub fn new(setup: R::Setup) -> (Self, LoadSender<R>) {
        let (sender, receiver) = crossbeam_channel::bounded(1);
        let cancelled = Arc::new(AtomicBool::new(false));
        let loader = Self {
            setup,
            id: Id::invalid(),
            receiver,
            cancelled: cancelled.clone(),
        };
        (loader, LoadSender { sender, cancelled })
    }

    /// `start` 之后的资源句柄
    pub fn id(&self) -> Id {
        self.id
    }
}

impl<R: AsyncResource> ResourceLoader for ChannelLoader<R> {
    fn locator(&self) -> &Locator {
        self.setup.locator()
    }

    fn start(&mut self, container: &mut ResourceContainer) -> Id {
        self.id = container.prepare_async::<R>(self.setup.clone());
        resource_debug!(id = %self.id, locator = %self.setup.locator(), "Load started");
        self.id
    }

    fn continue_loading(&mut self, container: &mut ResourceContainer) -> ResourceState {
        match self.receiver.try_recv() {
            Ok(LoadMessage::Complete { setup, data }) => {
                let setup = setup.unwrap_or_else(|| self.setup.clone());
                container.init_async::<R>(self.id, setup, &data)
            }
            Ok(LoadMessage::Failed(error)) => {
                resource_warn!(id = %self.id, locator = %self.setup.locator(), "Load failed: {}", error);
                container.failed_async(self.id)
            }
            Err(TryRecvError::Empty) => ResourceState::Pending,
            Err(TryRecvError::Disconnected) => {
                resource_warn!(
                    id = %self.id,
                    locator = %self.setup.locator(),
                    "Load failed: {}",
                    LoadError::Disconnected
                );
                container.failed_async(self.id)
            }
        }
    }

    fn cancel(&mut self) {
        self.cancelled.store(true, Ordering::Release);
        resource_debug!(id = %self.id, "Load cancelled");
    }
}

type LoadJob<R> = Box<dyn FnOnce(LoadSender<R>) + Send + 'static>;

/// 在独立线程上运行加载任务的加载器
///
/// 任务在 `start` 时启动，通过 `LoadSender` 交付结果，
/// 可以用 `is_cancelled` 提前结束。
pub struct ThreadedLoader<R: AsyncResource> {
    inner: ChannelLoader<R>,
    sender: Option<LoadSender<R>>,
    job: Option<LoadJob<R>>,
    worker: Option<JoinHandle<()>>,
}

impl<R: AsyncResource> ThreadedLoader<R>
where
    R::Setup: Send,
{
    pub fn new<F>(setup: R::Setup, job: F) -> Self
    where
        F: FnOnce(LoadSender<R>) + Send + 'static,
    {
        let (inner, sender) = ChannelLoader::new(setup);
        Self {
            inner,
            sender: Some(sender),
            job: Some(Box::new(job)),
            worker: None,
        }
    }

    fn spawn_worker(&mut self) {
        let (Some(sender), Some(job)) = (self.sender.take(), self.job.take()) else {
            return;
        };
        let name = format!("loader-{}", self.inner.setup.locator());
        // 创建线程失败时发送端随闭包一起释放，下一帧按断开处理
        match thread::Builder::new().name(name).spawn(move || job(sender)) {
            Ok(handle) => self.worker = Some(handle),
            Err(e) => resource_error!(locator = %self.inner.setup.locator(), "Failed to spawn loader thread: {}", e),
        }
    }

    fn join_worker(&mut self) {
        if let Some(handle) = self.worker.take() {
            if handle.join().is_err() {
                resource_error!(locator = %self.inner.setup.locator(), "Loader thread panicked");
            }
        }
    }
}

impl<R: AsyncResource> ResourceLoader for ThreadedLoader<R>
where
    R::Setup: Send,
{
    fn locator(&self) -> &Locator {
        self.inner.locator()
    }

    fn start(&mut self, container: &mut ResourceContainer) -> Id {
        let id = self.inner.start(container);
        self.spawn_worker();
        id
    }

    fn continue_loading(&mut self, container: &mut ResourceContainer) -> ResourceState {
        let state = self.inner.continue_loading(container);
        if state != ResourceState::Pending {
            // 结果已交付，线程即将结束
            self.join_worker();
        }
        state
    }

    fn cancel(&mut self) {
        self.inner.cancel();
        // 不等待线程，任务自行检查取消标记
        self.worker = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::ResourceConfig;
    use crate::gfx::null::NullBackend;
    use crate::gfx::resources::{PixelFormat, Texture, TextureSetup};
    use crate::gfx::GraphicsBackend;
    use std::time::Duration;

    fn container() -> ResourceContainer {
        let mut config = ResourceConfig::default();
        config.set_all_pool_sizes(4);
        ResourceContainer::new(&config, NullBackend::new().create_factories())
    }

    fn tick_until_idle(container: &mut ResourceContainer) {
        for _ in 0..500 {
            container.update();
            if container.num_pending_loaders() == 0 {
                return;
            }
            thread::sleep(Duration::from_millis(2));
        }
        panic!("loaders did not finish");
    }

    #[test]
    fn test_threaded_loader_updates_setup() {
        let mut container = container();
        let setup = TextureSetup::from_pixel_data("decoded.png", 1, 1, PixelFormat::RGBA8);

        let id = container.load(Box::new(ThreadedLoader::<Texture>::new(setup, |sender| {
            let decoded = TextureSetup::from_pixel_data("decoded.png", 2, 2, PixelFormat::RGBA8);
            sender.complete_with(decoded, vec![0u8; 16]).unwrap();
        })));
        assert_eq!(container.query_state(id), ResourceState::Pending);

        tick_until_idle(&mut container);
        assert_eq!(container.query_state(id), ResourceState::Valid);
        let texture = container.get::<Texture>(id).expect("texture should exist");
        assert_eq!((texture.setup().width, texture.setup().height), (2, 2));
    }

    #[test]
    fn test_threaded_loader_error() {
        let mut container = container();
        let setup = TextureSetup::from_pixel_data("missing.png", 1, 1, PixelFormat::RGBA8);

        let id = container.load(Box::new(ThreadedLoader::<Texture>::new(setup, |sender| {
            sender.fail(LoadError::ReadFailed("missing.png".to_string())).unwrap();
        })));

        tick_until_idle(&mut container);
        assert_eq!(container.query_state(id), ResourceState::Failed);
    }

    #[test]
    fn test_cancel_is_visible_to_sender() {
        let setup = TextureSetup::from_pixel_data("slow.png", 1, 1, PixelFormat::RGBA8);
        let (mut loader, sender) = ChannelLoader::<Texture>::new(setup);
        assert!(!sender.is_cancelled());
        loader.cancel();
        assert!(sender.is_cancelled());
        assert!(matches!(sender.complete(vec![0u8; 4]), Err(LoadError::Cancelled)));
    }

    #[test]
    fn test_send_after_loader_dropped_reports_disconnect() {
        let setup = TextureSetup::from_pixel_data("orphan.png", 1, 1, PixelFormat::RGBA8);
        let (loader, sender) = ChannelLoader::<Texture>::new(setup);
        drop(loader);
        assert!(matches!(sender.complete(vec![0u8; 4]), Err(LoadError::Disconnected)));
    }
}
