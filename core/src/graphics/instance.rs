use std::sync::{
    Arc,
    Weak,
};

use log::info;
use raw_window_handle::{
    RawDisplayHandle,
    RawWindowHandle,
};
use smallvec::SmallVec;
use thiserror::Error;

use crate::gpu::{
    self,
    Adapter as _,
    GPUBackend,
    Instance as _,
};

use super::*;

#[derive(Clone, Copy, Debug, Error, PartialEq, Eq)]
pub enum RequestAdapterError {
    #[error("no adapter matches the requested options")]
    NotFound,
}

pub struct RequestAdapterOptions<'a, B: GPUBackend> {
    pub power_preference: gpu::PowerPreference,
    pub compatible_surface: Option<&'a B::Surface>,
}

impl<'a, B: GPUBackend> Default for RequestAdapterOptions<'a, B> {
    fn default() -> Self {
        Self {
            power_preference: gpu::PowerPreference::HighPerformance,
            compatible_surface: None,
        }
    }
}

pub struct Instance<B: GPUBackend> {
    instance: Arc<B::Instance>,
    adapters: SmallVec<[Adapter<B>; 2]>,
}

impl<B: GPUBackend> Instance<B> {
    pub fn new(instance: B::Instance) -> Arc<Self> {
        let instance_arc = Arc::new(instance);
        let result = Arc::new_cyclic(|result_weak| Self {
            instance: instance_arc.clone(),
            adapters: instance_arc
                .list_adapters()
                .iter()
                .map(|adapter| Adapter::<B> {
                    adapter: adapter as *const B::Adapter,
                    instance: result_weak.clone(),
                })
                .collect(),
        });
        info!("{}: found {} adapters", B::name(), result.adapters.len());
        result
    }

    pub fn adapters(&self) -> &[Adapter<B>] {
        &self.adapters
    }

    /// Picks the best adapter for the given options. Discrete GPUs win under
    /// [`PowerPreference::HighPerformance`](gpu::PowerPreference), integrated
    /// ones under [`PowerPreference::LowPower`](gpu::PowerPreference). Adapters
    /// that cannot present to the given surface are skipped entirely.
    pub fn request_adapter(
        &self,
        options: &RequestAdapterOptions<B>,
    ) -> Result<&Adapter<B>, RequestAdapterError> {
        let mut best: Option<(&Adapter<B>, u32)> = None;
        for adapter in &self.adapters {
            if let Some(surface) = options.compatible_surface {
                if !adapter.supports_surface(surface) {
                    continue;
                }
            }
            let score = rank_adapter(adapter.adapter_info().adapter_type, options.power_preference);
            if best.map_or(true, |(_, best_score)| score > best_score) {
                best = Some((adapter, score));
            }
        }
        best.map(|(adapter, _)| adapter)
            .ok_or(RequestAdapterError::NotFound)
    }

    pub unsafe fn create_surface(
        &self,
        display_handle: RawDisplayHandle,
        window_handle: RawWindowHandle,
    ) -> Result<B::Surface, gpu::SurfaceError> {
        unsafe { self.instance.create_surface(display_handle, window_handle) }
    }
}

fn rank_adapter(adapter_type: gpu::AdapterType, preference: gpu::PowerPreference) -> u32 {
    match (preference, adapter_type) {
        (gpu::PowerPreference::HighPerformance, gpu::AdapterType::Discrete) => 4,
        (gpu::PowerPreference::HighPerformance, gpu::AdapterType::Integrated) => 3,
        (gpu::PowerPreference::LowPower, gpu::AdapterType::Integrated) => 4,
        (gpu::PowerPreference::LowPower, gpu::AdapterType::Discrete) => 3,
        (_, gpu::AdapterType::Virtual) => 2,
        (_, gpu::AdapterType::Software) => 1,
        (_, gpu::AdapterType::Other) => 0,
    }
}

pub struct Adapter<B: GPUBackend> {
    // The pointee is owned by the instance which the Weak below keeps
    // reachable, so it outlives this struct.
    adapter: *const B::Adapter,
    instance: Weak<Instance<B>>,
}

impl<B: GPUBackend> Adapter<B> {
    #[inline(always)]
    pub fn adapter_info(&self) -> &gpu::AdapterInfo {
        unsafe { (*self.adapter).adapter_info() }
    }

    pub fn supports_surface(&self, surface: &B::Surface) -> bool {
        unsafe { (*self.adapter).supports_surface(surface) }
    }

    pub fn create_device(&self, info: &DeviceInfo) -> Result<Arc<Device<B>>, gpu::DeviceCreateError> {
        let device = unsafe { (*self.adapter).create_device() }?;
        let instance = self.instance.upgrade().unwrap();
        Ok(Device::new(device, instance, info))
    }
}

unsafe impl<B: GPUBackend> Send for Adapter<B> {}
unsafe impl<B: GPUBackend> Sync for Adapter<B> {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gpu::AdapterType;
    use crate::graphics::testing::*;

    #[test]
    fn high_performance_prefers_discrete() {
        let log = EventLog::default();
        let instance = Instance::<TestBackend>::new(TestInstance::with_adapters(
            &[(AdapterType::Integrated, true), (AdapterType::Discrete, true)],
            log,
        ));
        let adapter = instance
            .request_adapter(&RequestAdapterOptions::default())
            .unwrap();
        assert_eq!(adapter.adapter_info().adapter_type, AdapterType::Discrete);
    }

    #[test]
    fn low_power_prefers_integrated() {
        let log = EventLog::default();
        let instance = Instance::<TestBackend>::new(TestInstance::with_adapters(
            &[(AdapterType::Discrete, true), (AdapterType::Integrated, true)],
            log,
        ));
        let adapter = instance
            .request_adapter(&RequestAdapterOptions {
                power_preference: gpu::PowerPreference::LowPower,
                compatible_surface: None,
            })
            .unwrap();
        assert_eq!(adapter.adapter_info().adapter_type, AdapterType::Integrated);
    }

    #[test]
    fn surface_incompatible_adapters_are_skipped() {
        let log = EventLog::default();
        let instance = Instance::<TestBackend>::new(TestInstance::with_adapters(
            &[(AdapterType::Discrete, false), (AdapterType::Software, true)],
            log,
        ));
        let surface = TestSurface::new(640, 480);
        let adapter = instance
            .request_adapter(&RequestAdapterOptions {
                power_preference: gpu::PowerPreference::HighPerformance,
                compatible_surface: Some(&surface),
            })
            .unwrap();
        assert_eq!(adapter.adapter_info().adapter_type, AdapterType::Software);
    }

    #[test]
    fn no_adapter_left_is_an_error() {
        let log = EventLog::default();
        let instance = Instance::<TestBackend>::new(TestInstance::with_adapters(
            &[(AdapterType::Discrete, false)],
            log,
        ));
        let surface = TestSurface::new(640, 480);
        let result = instance.request_adapter(&RequestAdapterOptions {
            power_preference: gpu::PowerPreference::HighPerformance,
            compatible_surface: Some(&surface),
        });
        assert_eq!(result.err(), Some(RequestAdapterError::NotFound));
    }
}
