use std::sync::Arc;

use log::trace;

use crate::gpu::{
    Device as _,
    GPUBackend,
};

use super::*;

/// Owns frame pacing for one device. `begin_frame` advances the frame counter
/// shared with the destroyer, `end_frame` retires the frame and lets the
/// destroyer free whatever has aged out.
pub struct GraphicsContext<B: GPUBackend> {
    device: Arc<B::Device>,
    destroyer: Arc<DeferredDestroyer<B>>,
    current_frame: u64,
    completed_frame: u64,
    max_frames_in_flight: u32,
}

impl<B: GPUBackend> GraphicsContext<B> {
    pub(super) fn new(
        device: &Arc<B::Device>,
        destroyer: &Arc<DeferredDestroyer<B>>,
        max_frames_in_flight: u32,
    ) -> Self {
        Self {
            device: device.clone(),
            destroyer: destroyer.clone(),
            current_frame: 0u64,
            completed_frame: 0u64,
            max_frames_in_flight,
        }
    }

    pub fn begin_frame(&mut self) {
        self.current_frame += 1;
        self.destroyer.set_frame(self.current_frame);
        trace!("beginning frame {}", self.current_frame);
    }

    pub fn end_frame(&mut self) {
        assert_eq!(self.current_frame, self.completed_frame + 1);
        self.completed_frame += 1;
        self.destroyer.process_deletion_queue();
    }

    #[inline(always)]
    pub fn frame_count(&self) -> u64 {
        self.current_frame
    }

    #[inline(always)]
    pub fn frame_index(&self) -> u32 {
        (self.current_frame % self.max_frames_in_flight as u64) as u32
    }

    #[inline(always)]
    pub fn max_frames_in_flight(&self) -> u32 {
        self.max_frames_in_flight
    }
}

impl<B: GPUBackend> Drop for GraphicsContext<B> {
    fn drop(&mut self) {
        unsafe {
            self.device.wait_for_idle();
            self.destroyer.destroy_all();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gpu::{
        BufferInfo,
        BufferUsage,
        MemoryUsage,
    };
    use crate::graphics::testing::*;

    fn test_device(log: &EventLog) -> Arc<Device<TestBackend>> {
        let instance = Instance::<TestBackend>::new(TestInstance::new(log.clone()).unwrap());
        let adapter = instance
            .request_adapter(&RequestAdapterOptions::default())
            .unwrap();
        adapter.create_device(&DeviceInfo::default()).unwrap()
    }

    fn throwaway_buffer(device: &Device<TestBackend>, label: &str) {
        let buffer = device
            .create_buffer(
                &BufferInfo {
                    size: 16,
                    usage: BufferUsage::COPY_DST,
                },
                MemoryUsage::GpuOnly,
                Some(label),
            )
            .unwrap();
        drop(buffer);
    }

    #[test]
    fn frame_counters_advance() {
        let log = EventLog::default();
        let device = test_device(&log);
        let mut context = device.create_context();
        assert_eq!(context.frame_count(), 0);

        context.begin_frame();
        assert_eq!(context.frame_count(), 1);
        context.end_frame();

        context.begin_frame();
        context.end_frame();
        assert_eq!(context.frame_count(), 2);
        assert_eq!(context.frame_index(), 0);
    }

    #[test]
    #[should_panic]
    fn ending_a_frame_twice_panics() {
        let log = EventLog::default();
        let device = test_device(&log);
        let mut context = device.create_context();
        context.begin_frame();
        context.end_frame();
        context.end_frame();
    }

    #[test]
    fn dropped_resources_outlive_the_in_flight_window() {
        let log = EventLog::default();
        let device = test_device(&log);
        let mut context = device.create_context();

        // Dropped during frame 1. With 2 frames in flight it must survive
        // frames 2 and 3 and go away at the end of frame 4.
        context.begin_frame();
        throwaway_buffer(&device, "transient");
        context.end_frame();

        for _ in 0..2 {
            context.begin_frame();
            context.end_frame();
            assert!(log.snapshot().is_empty());
            assert_eq!(device.pending_destructions(), 1);
        }

        context.begin_frame();
        context.end_frame();
        assert_eq!(log.snapshot(), vec!["destroy buffer transient".to_string()]);
        assert_eq!(device.pending_destructions(), 0);
    }

    #[test]
    fn context_drop_flushes_the_queue() {
        let log = EventLog::default();
        let device = test_device(&log);
        let mut context = device.create_context();

        context.begin_frame();
        throwaway_buffer(&device, "flushed");
        context.end_frame();
        assert_eq!(device.pending_destructions(), 1);

        drop(context);
        assert_eq!(log.snapshot(), vec!["destroy buffer flushed".to_string()]);
        assert_eq!(device.pending_destructions(), 0);
    }

    #[test]
    fn resources_dropped_without_frames_wait_for_teardown() {
        let log = EventLog::default();
        let device = test_device(&log);

        throwaway_buffer(&device, "no frames");
        assert_eq!(device.pending_destructions(), 1);
        assert!(log.snapshot().is_empty());

        drop(device);
        assert_eq!(log.snapshot(), vec!["destroy buffer no frames".to_string()]);
    }
}
