use std::env;

use log::{
    info,
    warn,
};
use vetro_core::gpu::{
    BackendType,
    BufferInfo,
    BufferUsage,
    InstanceInfo,
    MemoryUsage,
    PresentMode,
    SwapchainInfo,
};
use vetro_core::graphics::{
    DeviceInfo,
    Instance,
    RequestAdapterOptions,
};
use vetro_headless::{
    HeadlessBackend,
    HeadlessInstance,
    HeadlessSurface,
};

const FRAME_COUNT: u64 = 12;
const STAGING_SIZE: u64 = 64 << 10;

fn main() {
    simple_logger::SimpleLogger::new().init().unwrap();

    let preferred = env::var("VETRO_BACKEND")
        .ok()
        .and_then(|name| match name.parse::<BackendType>() {
            Ok(backend) => Some(backend),
            Err(e) => {
                warn!("{}, using the platform default", e);
                None
            }
        })
        .unwrap_or_else(|| BackendType::platform_default_order()[0]);
    if preferred != BackendType::Headless {
        info!(
            "{} needs a window to present to, running headless instead",
            preferred
        );
    }

    let backend_instance = HeadlessInstance::new(&InstanceInfo {
        app_name: "frame_loop".to_string(),
        ..Default::default()
    });
    let instance = Instance::<HeadlessBackend>::new(backend_instance);
    let adapter = instance
        .request_adapter(&RequestAdapterOptions::default())
        .unwrap();
    info!("using adapter \"{}\"", adapter.adapter_info().name);

    let device = adapter.create_device(&DeviceInfo::default()).unwrap();
    let mut swapchain = device
        .create_swapchain(
            HeadlessSurface::new(),
            &SwapchainInfo {
                width: 1280,
                height: 720,
                present_mode: PresentMode::Fifo,
            },
        )
        .unwrap();
    info!(
        "swapchain is {}x{} {:?}",
        swapchain.width(),
        swapchain.height(),
        swapchain.format()
    );
    let mut context = device.create_context();

    while context.frame_count() < FRAME_COUNT {
        context.begin_frame();

        // A fresh staging buffer per frame. Dropping it hands it to the
        // deferred destroyer instead of freeing it while the frame is in
        // flight.
        let staging = device
            .create_buffer(
                &BufferInfo {
                    size: STAGING_SIZE,
                    usage: BufferUsage::COPY_SRC,
                },
                MemoryUsage::CpuToGpu,
                Some("per frame staging"),
            )
            .unwrap();
        staging.write(0, &context.frame_count().to_le_bytes());
        drop(staging);

        let index = swapchain.next_backbuffer().unwrap();
        let _backbuffer = swapchain.backbuffer_texture(index);
        swapchain.present().unwrap();

        context.end_frame();
        info!(
            "frame {} done, {} resources awaiting destruction",
            context.frame_count(),
            device.pending_destructions()
        );
    }

    drop(context);
    drop(swapchain);
    drop(device);
    info!("clean exit");
}
