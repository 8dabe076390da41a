use std::collections::VecDeque;
use std::sync::Mutex;

use log::{
    trace,
    warn,
};

use crate::gpu::GPUBackend;

pub(super) enum DeferredResource<B: GPUBackend> {
    Buffer(B::Buffer),
    Texture(B::Texture),
    BindGroupLayout(B::BindGroupLayout),
    Swapchain(B::Swapchain),
}

impl<B: GPUBackend> DeferredResource<B> {
    fn kind(&self) -> &'static str {
        match self {
            DeferredResource::Buffer(_) => "buffer",
            DeferredResource::Texture(_) => "texture",
            DeferredResource::BindGroupLayout(_) => "bind group layout",
            DeferredResource::Swapchain(_) => "swapchain",
        }
    }
}

/// Holds resources that were dropped on the CPU side until every frame that
/// might still reference them on the GPU has left the pipeline.
///
/// Any thread may enqueue. The frame counter is owned by the single thread
/// driving the [`GraphicsContext`](super::GraphicsContext).
pub(super) struct DeferredDestroyer<B: GPUBackend> {
    max_frames_in_flight: u32,
    inner: Mutex<DeferredDestroyerInner<B>>,
}

struct DeferredDestroyerInner<B: GPUBackend> {
    current_frame: u64,
    shutting_down: bool,
    queue: VecDeque<(u64, DeferredResource<B>)>,
}

impl<B: GPUBackend> DeferredDestroyer<B> {
    pub(super) fn new(max_frames_in_flight: u32) -> Self {
        Self {
            max_frames_in_flight,
            inner: Mutex::new(DeferredDestroyerInner::<B> {
                current_frame: 0u64,
                shutting_down: false,
                queue: VecDeque::new(),
            }),
        }
    }

    pub(super) fn destroy_buffer(&self, buffer: B::Buffer) {
        self.queue_destroy(DeferredResource::Buffer(buffer));
    }

    pub(super) fn destroy_texture(&self, texture: B::Texture) {
        self.queue_destroy(DeferredResource::Texture(texture));
    }

    pub(super) fn destroy_bind_group_layout(&self, layout: B::BindGroupLayout) {
        self.queue_destroy(DeferredResource::BindGroupLayout(layout));
    }

    pub(super) fn destroy_swapchain(&self, swapchain: B::Swapchain) {
        self.queue_destroy(DeferredResource::Swapchain(swapchain));
    }

    fn queue_destroy(&self, resource: DeferredResource<B>) {
        let mut guard = self.inner.lock().unwrap();
        if guard.shutting_down {
            drop(guard);
            trace!("destroying {} immediately, device is shutting down", resource.kind());
            drop(resource);
            return;
        }
        let frame = guard.current_frame;
        guard.queue.push_back((frame, resource));
    }

    /// Called once per frame by the context. The frame counter never moves
    /// backwards.
    pub(super) fn set_frame(&self, frame: u64) {
        let mut guard = self.inner.lock().unwrap();
        assert!(guard.current_frame <= frame);
        guard.current_frame = frame;
    }

    /// Frees every queued resource that has aged out of the frames in flight
    /// window. Entries carry non decreasing frame stamps, so the scan can stop
    /// at the first entry that is still too young.
    pub(super) fn process_deletion_queue(&self) {
        let mut expired = Vec::<DeferredResource<B>>::new();
        {
            let mut guard = self.inner.lock().unwrap();
            let current_frame = guard.current_frame;
            let lifetime = self.max_frames_in_flight as u64;
            while let Some(&(enqueued_frame, _)) = guard.queue.front() {
                if enqueued_frame + lifetime >= current_frame {
                    break;
                }
                if let Some((_, resource)) = guard.queue.pop_front() {
                    expired.push(resource);
                }
            }
        }
        // Native teardown happens without holding the queue lock.
        if !expired.is_empty() {
            trace!("destroying {} resources that aged out", expired.len());
        }
        drop(expired);
    }

    pub(super) fn mark_shutting_down(&self) {
        let mut guard = self.inner.lock().unwrap();
        guard.shutting_down = true;
    }

    /// Drains the queue regardless of entry age.
    ///
    /// # Safety
    /// The caller has to guarantee that the GPU is idle.
    pub(super) unsafe fn destroy_all(&self) {
        let drained: Vec<(u64, DeferredResource<B>)> = {
            let mut guard = self.inner.lock().unwrap();
            guard.queue.drain(..).collect()
        };
        drop(drained);
    }

    pub(super) fn pending_len(&self) -> usize {
        let guard = self.inner.lock().unwrap();
        guard.queue.len()
    }
}

impl<B: GPUBackend> Drop for DeferredDestroyer<B> {
    fn drop(&mut self) {
        let Ok(guard) = self.inner.lock() else {
            return;
        };
        if !guard.queue.is_empty() {
            warn!(
                "deferred destroyer dropped with {} resources still queued",
                guard.queue.len()
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;
    use std::sync::Arc;
    use std::thread;

    use super::*;
    use crate::gpu::{
        BufferInfo,
        BufferUsage,
        MemoryUsage,
    };
    use crate::graphics::testing::*;

    fn buffer(log: &EventLog, label: &str) -> TestBuffer {
        TestBuffer::new(
            &BufferInfo {
                size: 16,
                usage: BufferUsage::COPY_DST,
            },
            MemoryUsage::CpuToGpu,
            Some(label),
            log.clone(),
        )
    }

    #[test]
    fn resources_survive_the_frames_in_flight_window() {
        let log = EventLog::default();
        let destroyer = DeferredDestroyer::<TestBackend>::new(2);

        destroyer.set_frame(10);
        destroyer.destroy_buffer(buffer(&log, "A"));

        destroyer.set_frame(11);
        destroyer.process_deletion_queue();
        assert!(log.snapshot().is_empty());
        assert_eq!(destroyer.pending_len(), 1);

        destroyer.set_frame(12);
        destroyer.process_deletion_queue();
        assert!(log.snapshot().is_empty());

        destroyer.set_frame(13);
        destroyer.process_deletion_queue();
        assert_eq!(log.snapshot(), vec!["destroy buffer A".to_string()]);
        assert_eq!(destroyer.pending_len(), 0);
    }

    #[test]
    fn queue_frees_in_fifo_order() {
        let log = EventLog::default();
        let destroyer = DeferredDestroyer::<TestBackend>::new(2);

        destroyer.set_frame(5);
        destroyer.destroy_buffer(buffer(&log, "B"));
        destroyer.set_frame(6);
        destroyer.destroy_buffer(buffer(&log, "C"));

        destroyer.set_frame(8);
        destroyer.process_deletion_queue();
        assert_eq!(log.snapshot(), vec!["destroy buffer B".to_string()]);
        assert_eq!(destroyer.pending_len(), 1);

        destroyer.set_frame(9);
        destroyer.process_deletion_queue();
        assert_eq!(
            log.snapshot(),
            vec!["destroy buffer B".to_string(), "destroy buffer C".to_string()]
        );
    }

    #[test]
    fn processing_an_empty_queue_does_nothing() {
        let destroyer = DeferredDestroyer::<TestBackend>::new(2);
        destroyer.set_frame(100);
        destroyer.process_deletion_queue();
        assert_eq!(destroyer.pending_len(), 0);
    }

    #[test]
    fn shutdown_destroys_synchronously() {
        let log = EventLog::default();
        let destroyer = DeferredDestroyer::<TestBackend>::new(2);

        destroyer.set_frame(4);
        destroyer.mark_shutting_down();
        destroyer.destroy_buffer(buffer(&log, "late"));

        assert_eq!(log.snapshot(), vec!["destroy buffer late".to_string()]);
        assert_eq!(destroyer.pending_len(), 0);
    }

    #[test]
    fn destroy_all_drains_everything() {
        let log = EventLog::default();
        let destroyer = DeferredDestroyer::<TestBackend>::new(2);

        destroyer.set_frame(3);
        destroyer.destroy_buffer(buffer(&log, "X"));
        destroyer.destroy_texture(TestTexture::new(
            &Default::default(),
            Some("Y"),
            log.clone(),
        ));
        assert_eq!(destroyer.pending_len(), 2);

        unsafe {
            destroyer.destroy_all();
        }
        assert_eq!(
            log.snapshot(),
            vec!["destroy buffer X".to_string(), "destroy texture Y".to_string()]
        );
        assert_eq!(destroyer.pending_len(), 0);
    }

    #[test]
    fn mixed_resource_kinds_age_out_together() {
        let log = EventLog::default();
        let destroyer = DeferredDestroyer::<TestBackend>::new(1);

        destroyer.set_frame(1);
        destroyer.destroy_buffer(buffer(&log, "buf"));
        destroyer.destroy_bind_group_layout(TestBindGroupLayout::new(
            &Default::default(),
            Some("layout"),
            log.clone(),
        ));

        destroyer.set_frame(3);
        destroyer.process_deletion_queue();
        assert_eq!(
            log.snapshot(),
            vec![
                "destroy buffer buf".to_string(),
                "destroy bind group layout layout".to_string()
            ]
        );
    }

    #[test]
    fn each_resource_is_destroyed_exactly_once_across_threads() {
        let log = EventLog::default();
        let destroyer = Arc::new(DeferredDestroyer::<TestBackend>::new(2));

        let mut handles = Vec::new();
        for t in 0..4 {
            let destroyer = destroyer.clone();
            let log = log.clone();
            handles.push(thread::spawn(move || {
                for i in 0..64 {
                    destroyer.destroy_buffer(buffer(&log, &format!("{}-{}", t, i)));
                }
            }));
        }
        for frame in 1..=16u64 {
            destroyer.set_frame(frame);
            destroyer.process_deletion_queue();
        }
        for handle in handles {
            handle.join().unwrap();
        }

        destroyer.set_frame(100);
        destroyer.process_deletion_queue();

        let events = log.snapshot();
        assert_eq!(events.len(), 4 * 64);
        let mut seen = HashSet::<String>::new();
        for event in &events {
            assert!(seen.insert(event.clone()), "{} destroyed twice", event);
        }
    }

    #[test]
    #[should_panic]
    fn frame_counter_must_not_go_backwards() {
        let destroyer = DeferredDestroyer::<TestBackend>::new(2);
        destroyer.set_frame(10);
        destroyer.set_frame(9);
    }
}
