//! A backend that fulfills the whole `vetro_core::gpu` contract without
//! talking to any driver. Surfaces can be conjured out of thin air, buffers
//! live in host memory and every native teardown is appended to a
//! [`DestructionLog`] shared by the instance, so callers can observe when
//! the deferred destroyer actually released something. This is what the
//! integration tests and the demo run on.

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

use log::debug;
use raw_window_handle::{
    RawDisplayHandle,
    RawWindowHandle,
};
use vetro_core::gpu;
use vetro_core::gpu::{
    AdapterInfo,
    AdapterType,
    BackendType,
    BindGroupLayoutInfo,
    BufferInfo,
    DeviceCreateError,
    Format,
    InstanceInfo,
    MemoryUsage,
    OutOfMemoryError,
    SurfaceError,
    SwapchainError,
    SwapchainInfo,
    TextureDimension,
    TextureInfo,
    TextureUsage,
};

#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum HeadlessBackend {}

impl gpu::GPUBackend for HeadlessBackend {
    type Instance = HeadlessInstance;
    type Adapter = HeadlessAdapter;
    type Device = HeadlessDevice;
    type Surface = HeadlessSurface;
    type Swapchain = HeadlessSwapchain;
    type Buffer = HeadlessBuffer;
    type Texture = HeadlessTexture;
    type BindGroupLayout = HeadlessBindGroupLayout;

    fn name() -> &'static str {
        "Headless"
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ResourceKind {
    Buffer,
    Texture,
    BindGroupLayout,
    Swapchain,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DestructionRecord {
    pub kind: ResourceKind,
    pub label: Option<String>,
}

/// Every native teardown the backend performs lands here, in the order it
/// happened. Clone the handle before handing the instance off, the records
/// are shared.
#[derive(Clone, Default)]
pub struct DestructionLog {
    records: Arc<Mutex<Vec<DestructionRecord>>>,
}

impl DestructionLog {
    fn record(&self, kind: ResourceKind, label: Option<&str>) {
        self.records.lock().unwrap().push(DestructionRecord {
            kind,
            label: label.map(|l| l.to_string()),
        });
    }

    pub fn records(&self) -> Vec<DestructionRecord> {
        self.records.lock().unwrap().clone()
    }

    /// Records of one kind only, in destruction order.
    pub fn records_of(&self, kind: ResourceKind) -> Vec<DestructionRecord> {
        self.records
            .lock()
            .unwrap()
            .iter()
            .filter(|record| record.kind == kind)
            .cloned()
            .collect()
    }

    pub fn len(&self) -> usize {
        self.records.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.lock().unwrap().is_empty()
    }
}

static NEXT_ID: AtomicU64 = AtomicU64::new(1);

fn next_id() -> u64 {
    NEXT_ID.fetch_add(1, Ordering::Relaxed)
}

pub struct HeadlessInstance {
    adapters: Vec<HeadlessAdapter>,
    log: DestructionLog,
}

impl HeadlessInstance {
    pub fn new(info: &InstanceInfo) -> Self {
        let log = DestructionLog::default();
        debug!("headless instance for \"{}\"", info.app_name);
        Self {
            adapters: vec![HeadlessAdapter {
                info: AdapterInfo {
                    name: "Headless Adapter".to_string(),
                    adapter_type: AdapterType::Software,
                    backend: BackendType::Headless,
                },
                log: log.clone(),
            }],
            log,
        }
    }

    pub fn destruction_log(&self) -> DestructionLog {
        self.log.clone()
    }
}

impl gpu::Instance<HeadlessBackend> for HeadlessInstance {
    fn list_adapters(&self) -> &[HeadlessAdapter] {
        &self.adapters
    }

    unsafe fn create_surface(
        &self,
        _display_handle: RawDisplayHandle,
        _window_handle: RawWindowHandle,
    ) -> Result<HeadlessSurface, SurfaceError> {
        // Any window handle works, there is nothing to present to anyway.
        Ok(HeadlessSurface::new())
    }
}

pub struct HeadlessAdapter {
    info: AdapterInfo,
    log: DestructionLog,
}

impl gpu::Adapter<HeadlessBackend> for HeadlessAdapter {
    fn adapter_info(&self) -> &AdapterInfo {
        &self.info
    }

    fn supports_surface(&self, _surface: &HeadlessSurface) -> bool {
        true
    }

    unsafe fn create_device(&self) -> Result<HeadlessDevice, DeviceCreateError> {
        debug!("created headless device");
        Ok(HeadlessDevice {
            log: self.log.clone(),
        })
    }
}

pub struct HeadlessDevice {
    log: DestructionLog,
}

impl HeadlessDevice {
    pub fn destruction_log(&self) -> DestructionLog {
        self.log.clone()
    }
}

impl gpu::Device<HeadlessBackend> for HeadlessDevice {
    unsafe fn create_buffer(
        &self,
        info: &BufferInfo,
        memory_usage: MemoryUsage,
        name: Option<&str>,
    ) -> Result<HeadlessBuffer, OutOfMemoryError> {
        Ok(HeadlessBuffer::new(info, memory_usage, name, &self.log))
    }

    unsafe fn create_texture(
        &self,
        info: &TextureInfo,
        name: Option<&str>,
    ) -> Result<HeadlessTexture, OutOfMemoryError> {
        Ok(HeadlessTexture::new(info, name, &self.log))
    }

    unsafe fn create_bind_group_layout(
        &self,
        _info: &BindGroupLayoutInfo,
        name: Option<&str>,
    ) -> Result<HeadlessBindGroupLayout, OutOfMemoryError> {
        Ok(HeadlessBindGroupLayout {
            label: name.map(|n| n.to_string()),
            log: self.log.clone(),
        })
    }

    unsafe fn create_swapchain(
        &self,
        surface: HeadlessSurface,
        info: &SwapchainInfo,
    ) -> Result<HeadlessSwapchain, SwapchainError> {
        HeadlessSwapchain::new(surface, info, &self.log)
    }

    unsafe fn wait_for_idle(&self) {}
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct HeadlessSurface {
    id: u64,
}

impl HeadlessSurface {
    /// Headless surfaces do not need a window behind them.
    pub fn new() -> Self {
        Self { id: next_id() }
    }
}

impl Default for HeadlessSurface {
    fn default() -> Self {
        Self::new()
    }
}

pub struct HeadlessBuffer {
    id: u64,
    info: BufferInfo,
    label: Option<String>,
    mappable: bool,
    data: UnsafeCell<Box<[u8]>>,
    log: DestructionLog,
}

unsafe impl Send for HeadlessBuffer {}
unsafe impl Sync for HeadlessBuffer {}

impl HeadlessBuffer {
    fn new(
        info: &BufferInfo,
        memory_usage: MemoryUsage,
        name: Option<&str>,
        log: &DestructionLog,
    ) -> Self {
        Self {
            id: next_id(),
            info: info.clone(),
            label: name.map(|n| n.to_string()),
            mappable: memory_usage != MemoryUsage::GpuOnly,
            data: UnsafeCell::new(vec![0u8; info.size as usize].into_boxed_slice()),
            log: log.clone(),
        }
    }
}

impl Drop for HeadlessBuffer {
    fn drop(&mut self) {
        self.log
            .record(ResourceKind::Buffer, self.label.as_deref());
    }
}

impl gpu::Buffer for HeadlessBuffer {
    fn info(&self) -> &BufferInfo {
        &self.info
    }

    unsafe fn map_unsafe(
        &self,
        offset: u64,
        _length: u64,
        _invalidate: bool,
    ) -> Option<*mut c_void> {
        if !self.mappable {
            return None;
        }
        let data = unsafe { &mut *self.data.get() };
        Some(unsafe { data.as_mut_ptr().add(offset as usize) } as *mut c_void)
    }

    unsafe fn unmap_unsafe(&self, _offset: u64, _length: u64, _flush: bool) {}
}

impl Hash for HeadlessBuffer {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl PartialEq for HeadlessBuffer {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for HeadlessBuffer {}

pub struct HeadlessTexture {
    id: u64,
    info: TextureInfo,
    label: Option<String>,
    log: DestructionLog,
}

impl HeadlessTexture {
    fn new(info: &TextureInfo, name: Option<&str>, log: &DestructionLog) -> Self {
        Self {
            id: next_id(),
            info: *info,
            label: name.map(|n| n.to_string()),
            log: log.clone(),
        }
    }
}

impl Drop for HeadlessTexture {
    fn drop(&mut self) {
        self.log
            .record(ResourceKind::Texture, self.label.as_deref());
    }
}

impl gpu::Texture for HeadlessTexture {
    fn info(&self) -> &TextureInfo {
        &self.info
    }
}

impl PartialEq for HeadlessTexture {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for HeadlessTexture {}

pub struct HeadlessBindGroupLayout {
    label: Option<String>,
    log: DestructionLog,
}

impl Drop for HeadlessBindGroupLayout {
    fn drop(&mut self) {
        self.log
            .record(ResourceKind::BindGroupLayout, self.label.as_deref());
    }
}

pub struct HeadlessSwapchain {
    surface: HeadlessSurface,
    textures: Vec<HeadlessTexture>,
    width: u32,
    height: u32,
    acquire_counter: u64,
    log: DestructionLog,
}

impl HeadlessSwapchain {
    const IMAGE_COUNT: u32 = 3;

    fn backbuffers(width: u32, height: u32, log: &DestructionLog) -> Vec<HeadlessTexture> {
        (0..Self::IMAGE_COUNT)
            .map(|index| {
                HeadlessTexture::new(
                    &TextureInfo {
                        dimension: TextureDimension::Dim2D,
                        format: Format::BGRA8UNorm,
                        width,
                        height,
                        usage: TextureUsage::RENDER_TARGET | TextureUsage::COPY_DST,
                        ..Default::default()
                    },
                    Some(&format!("backbuffer {}", index)),
                    log,
                )
            })
            .collect()
    }

    fn new(
        surface: HeadlessSurface,
        info: &SwapchainInfo,
        log: &DestructionLog,
    ) -> Result<Self, SwapchainError> {
        if info.width == 0 || info.height == 0 {
            return Err(SwapchainError::ZeroExtents);
        }
        Ok(Self {
            surface,
            textures: Self::backbuffers(info.width, info.height, log),
            width: info.width,
            height: info.height,
            acquire_counter: 0u64,
            log: log.clone(),
        })
    }
}

impl Drop for HeadlessSwapchain {
    fn drop(&mut self) {
        self.log.record(ResourceKind::Swapchain, None);
    }
}

impl gpu::Swapchain<HeadlessBackend> for HeadlessSwapchain {
    fn format(&self) -> Format {
        Format::BGRA8UNorm
    }

    fn surface(&self) -> &HeadlessSurface {
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

    unsafe fn backbuffer_texture(&self, index: u32) -> &HeadlessTexture {
        &self.textures[index as usize]
    }

    unsafe fn present(&mut self) -> Result<(), SwapchainError> {
        Ok(())
    }
}
