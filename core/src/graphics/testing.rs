//! A process local backend used by the unit tests in this crate. Destruction
//! of every resource is recorded in an [`EventLog`] so tests can assert when
//! the deferred destroyer actually frees things.

use std::cell::UnsafeCell;
use std::ffi::c_void;
use std::hash::{
    Hash,
    Hasher,
};
use std::sync::atomic::{
    AtomicU64,
    Ordering,
};
use std::sync::{
    Arc,
    Mutex,
};

use raw_window_handle::{
    RawDisplayHandle,
    RawWindowHandle,
};

use crate::gpu;
use crate::gpu::{
    AdapterInfo,
    AdapterType,
    BackendType,
    BindGroupLayoutInfo,
    BufferInfo,
    DeviceCreateError,
    Format,
    InstanceCreateError,
    MemoryUsage,
    OutOfMemoryError,
    SurfaceError,
    SwapchainError,
    SwapchainInfo,
    TextureDimension,
    TextureInfo,
    TextureUsage,
};

pub(crate) struct TestBackend;

impl gpu::GPUBackend for TestBackend {
    type Instance = TestInstance;
    type Adapter = TestAdapter;
    type Device = TestDevice;
    type Surface = TestSurface;
    type Swapchain = TestSwapchain;
    type Buffer = TestBuffer;
    type Texture = TestTexture;
    type BindGroupLayout = TestBindGroupLayout;

    fn name() -> &'static str {
        "Test"
    }
}

#[derive(Clone, Default)]
pub(crate) struct EventLog {
    events: Arc<Mutex<Vec<String>>>,
}

impl EventLog {
    pub(crate) fn record(&self, event: impl Into<String>) {
        self.events.lock().unwrap().push(event.into());
    }

    pub(crate) fn snapshot(&self) -> Vec<String> {
        self.events.lock().unwrap().clone()
    }

    pub(crate) fn len(&self) -> usize {
        self.events.lock().unwrap().len()
    }
}

static NEXT_RESOURCE_ID: AtomicU64 = AtomicU64::new(1);

fn next_id() -> u64 {
    NEXT_RESOURCE_ID.fetch_add(1, Ordering::Relaxed)
}

fn display_name(label: Option<&str>, id: u64) -> String {
    label.map(|l| l.to_string()).unwrap_or_else(|| id.to_string())
}

pub(crate) struct TestInstance {
    adapters: Vec<TestAdapter>,
}

impl TestInstance {
    pub(crate) fn new(log: EventLog) -> Result<Self, InstanceCreateError> {
        Ok(Self::with_adapters(&[(AdapterType::Discrete, true)], log))
    }

    /// One entry per adapter: its type and whether it can present to surfaces.
    pub(crate) fn with_adapters(adapters: &[(AdapterType, bool)], log: EventLog) -> Self {
        Self {
            adapters: adapters
                .iter()
                .enumerate()
                .map(|(index, &(adapter_type, supports_surfaces))| TestAdapter {
                    info: AdapterInfo {
                        name: format!("test adapter {}", index),
                        adapter_type,
                        backend: BackendType::Headless,
                    },
                    supports_surfaces,
                    log: log.clone(),
                })
                .collect(),
        }
    }
}

impl gpu::Instance<TestBackend> for TestInstance {
    fn list_adapters(&self) -> &[TestAdapter] {
        &self.adapters
    }

    unsafe fn create_surface(
        &self,
        _display_handle: RawDisplayHandle,
        _window_handle: RawWindowHandle,
    ) -> Result<TestSurface, SurfaceError> {
        Ok(TestSurface::new(640, 480))
    }
}

pub(crate) struct TestAdapter {
    info: AdapterInfo,
    supports_surfaces: bool,
    log: EventLog,
}

impl gpu::Adapter<TestBackend> for TestAdapter {
    fn adapter_info(&self) -> &AdapterInfo {
        &self.info
    }

    fn supports_surface(&self, _surface: &TestSurface) -> bool {
        self.supports_surfaces
    }

    unsafe fn create_device(&self) -> Result<TestDevice, DeviceCreateError> {
        Ok(TestDevice {
            log: self.log.clone(),
        })
    }
}

pub(crate) struct TestDevice {
    log: EventLog,
}

impl gpu::Device<TestBackend> for TestDevice {
    unsafe fn create_buffer(
        &self,
        info: &BufferInfo,
        memory_usage: MemoryUsage,
        name: Option<&str>,
    ) -> Result<TestBuffer, OutOfMemoryError> {
        Ok(TestBuffer::new(info, memory_usage, name, self.log.clone()))
    }

    unsafe fn create_texture(
        &self,
        info: &TextureInfo,
        name: Option<&str>,
    ) -> Result<TestTexture, OutOfMemoryError> {
        Ok(TestTexture::new(info, name, self.log.clone()))
    }

    unsafe fn create_bind_group_layout(
        &self,
        info: &BindGroupLayoutInfo,
        name: Option<&str>,
    ) -> Result<TestBindGroupLayout, OutOfMemoryError> {
        Ok(TestBindGroupLayout::new(info, name, self.log.clone()))
    }

    unsafe fn create_swapchain(
        &self,
        surface: TestSurface,
        info: &SwapchainInfo,
    ) -> Result<TestSwapchain, SwapchainError> {
        TestSwapchain::new(surface, info, self.log.clone())
    }

    unsafe fn wait_for_idle(&self) {}
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct TestSurface {
    pub(crate) width: u32,
    pub(crate) height: u32,
    id: u64,
}

impl TestSurface {
    pub(crate) fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            id: next_id(),
        }
    }
}

pub(crate) struct TestBuffer {
    id: u64,
    info: BufferInfo,
    label: Option<String>,
    mappable: bool,
    data: UnsafeCell<Box<[u8]>>,
    log: EventLog,
}

unsafe impl Send for TestBuffer {}
unsafe impl Sync for TestBuffer {}

impl TestBuffer {
    pub(crate) fn new(
        info: &BufferInfo,
        memory_usage: MemoryUsage,
        name: Option<&str>,
        log: EventLog,
    ) -> Self {
        Self {
            id: next_id(),
            info: info.clone(),
            label: name.map(|n| n.to_string()),
            mappable: memory_usage != MemoryUsage::GpuOnly,
            data: UnsafeCell::new(vec![0u8; info.size as usize].into_boxed_slice()),
            log,
        }
    }
}

impl Drop for TestBuffer {
    fn drop(&mut self) {
        self.log.record(format!(
            "destroy buffer {}",
            display_name(self.label.as_deref(), self.id)
        ));
    }
}

impl gpu::Buffer for TestBuffer {
    fn info(&self) -> &BufferInfo {
        &self.info
    }

    unsafe fn map_unsafe(&self, offset: u64, _length: u64, _invalidate: bool) -> Option<*mut c_void> {
        if !self.mappable {
            return None;
        }
        let data = unsafe { &mut *self.data.get() };
        Some(unsafe { data.as_mut_ptr().add(offset as usize) } as *mut c_void)
    }

    unsafe fn unmap_unsafe(&self, _offset: u64, _length: u64, _flush: bool) {}
}

impl Hash for TestBuffer {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl PartialEq for TestBuffer {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for TestBuffer {}

pub(crate) struct TestTexture {
    id: u64,
    info: TextureInfo,
    label: Option<String>,
    log: EventLog,
}

impl TestTexture {
    pub(crate) fn new(info: &TextureInfo, name: Option<&str>, log: EventLog) -> Self {
        Self {
            id: next_id(),
            info: *info,
            label: name.map(|n| n.to_string()),
            log,
        }
    }
}

impl Drop for TestTexture {
    fn drop(&mut self) {
        self.log.record(format!(
            "destroy texture {}",
            display_name(self.label.as_deref(), self.id)
        ));
    }
}

impl gpu::Texture for TestTexture {
    fn info(&self) -> &TextureInfo {
        &self.info
    }
}

impl PartialEq for TestTexture {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for TestTexture {}

pub(crate) struct TestBindGroupLayout {
    id: u64,
    label: Option<String>,
    log: EventLog,
}

impl TestBindGroupLayout {
    pub(crate) fn new(_info: &BindGroupLayoutInfo, name: Option<&str>, log: EventLog) -> Self {
        Self {
            id: next_id(),
            label: name.map(|n| n.to_string()),
            log,
        }
    }
}

impl Drop for TestBindGroupLayout {
    fn drop(&mut self) {
        self.log.record(format!(
            "destroy bind group layout {}",
            display_name(self.label.as_deref(), self.id)
        ));
    }
}

pub(crate) struct TestSwapchain {
    surface: TestSurface,
    textures: Vec<TestTexture>,
    width: u32,
    height: u32,
    acquire_counter: u64,
    log: EventLog,
}

impl TestSwapchain {
    const IMAGE_COUNT: u32 = 3;

    fn backbuffers(width: u32, height: u32, log: &EventLog) -> Vec<TestTexture> {
        (0..Self::IMAGE_COUNT)
            .map(|index| {
                TestTexture::new(
                    &TextureInfo {
                        dimension: TextureDimension::Dim2D,
                        format: Format::BGRA8UNorm,
                        width,
                        height,
                        usage: TextureUsage::RENDER_TARGET | TextureUsage::COPY_DST,
                        ..Default::default()
                    },
                    Some(&format!("test backbuffer {}", index)),
                    log.clone(),
                )
            })
            .collect()
    }

    pub(crate) fn new(
        surface: TestSurface,
        info: &SwapchainInfo,
        log: EventLog,
    ) -> Result<Self, SwapchainError> {
        if info.width == 0 || info.height == 0 {
            return Err(SwapchainError::ZeroExtents);
        }
        Ok(Self {
            surface,
            textures: Self::backbuffers(info.width, info.height, &log),
            width: info.width,
            height: info.height,
            acquire_counter: 0u64,
            log,
        })
    }
}

impl Drop for TestSwapchain {
    fn drop(&mut self) {
        self.log.record("destroy swapchain".to_string());
    }
}

impl gpu::Swapchain<TestBackend> for TestSwapchain {
    fn format(&self) -> Format {
        Format::BGRA8UNorm
    }

    fn surface(&self) -> &TestSurface {
        &self.surface
    }

    fn width(&self) -> u32 {
        self.width
    }

    fn height(&self) -> u32 {
        self.height
    }

    unsafe fn recreate(&mut self, width: u32, height: u32) -> Result<(), SwapchainError> {
        if width == 0 || height == 0 {
            return Err(SwapchainError::ZeroExtents);
        }
        self.textures = Self::backbuffers(width, height, &self.log);
        self.width = width;
        self.height = height;
        Ok(())
    }

    unsafe fn next_backbuffer(&mut self) -> Result<u32, SwapchainError> {
        let index = (self.acquire_counter % Self::IMAGE_COUNT as u64) as u32;
        self.acquire_counter += 1;
        Ok(index)
    }

    unsafe fn backbuffer_texture(&self, index: u32) -> &TestTexture {
        &self.textures[index as usize]
    }

    unsafe fn present(&mut self) -> Result<(), SwapchainError> {
        Ok(())
    }
}
