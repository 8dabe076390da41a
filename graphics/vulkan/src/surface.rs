use std::sync::Arc;

use ash::vk;
use raw_window_handle::{
    RawDisplayHandle,
    RawWindowHandle,
};
use vetro_core::gpu::SurfaceError;

use super::*;

pub struct VkSurface {
    surface: vk::SurfaceKHR,
    instance: Arc<RawVkInstance>,
}

impl VkSurface {
    pub unsafe fn new(
        instance: &Arc<RawVkInstance>,
        display_handle: RawDisplayHandle,
        window_handle: RawWindowHandle,
    ) -> Result<Self, SurfaceError> {
        let surface = unsafe { create_raw_surface(instance, display_handle, window_handle) }?;
        Ok(Self {
            surface,
            instance: instance.clone(),
        })
    }

    #[inline(always)]
    pub fn surface_handle(&self) -> vk::SurfaceKHR {
        self.surface
    }

    pub(crate) fn get_capabilities(
        &self,
        physical_device: vk::PhysicalDevice,
    ) -> Result<vk::SurfaceCapabilitiesKHR, vk::Result> {
        unsafe {
            self.instance
                .surface_instance
                .get_physical_device_surface_capabilities(physical_device, self.surface)
        }
    }

    pub(crate) fn get_formats(
        &self,
        physical_device: vk::PhysicalDevice,
    ) -> Result<Vec<vk::SurfaceFormatKHR>, vk::Result> {
        unsafe {
            self.instance
                .surface_instance
                .get_physical_device_surface_formats(physical_device, self.surface)
        }
    }

    pub(crate) fn get_present_modes(
        &self,
        physical_device: vk::PhysicalDevice,
    ) -> Result<Vec<vk::PresentModeKHR>, vk::Result> {
        unsafe {
            self.instance
                .surface_instance
                .get_physical_device_surface_present_modes(physical_device, self.surface)
        }
    }
}

impl PartialEq for VkSurface {
    fn eq(&self, other: &Self) -> bool {
        self.surface == other.surface
    }
}

impl Eq for VkSurface {}

impl Drop for VkSurface {
    fn drop(&mut self) {
        unsafe {
            self.instance
                .surface_instance
                .destroy_surface(self.surface, None);
        }
    }
}

unsafe fn create_raw_surface(
    instance: &Arc<RawVkInstance>,
    display_handle: RawDisplayHandle,
    window_handle: RawWindowHandle,
) -> Result<vk::SurfaceKHR, SurfaceError> {
    match (display_handle, window_handle) {
        #[cfg(target_os = "windows")]
        (RawDisplayHandle::Windows(_), RawWindowHandle::Win32(handle)) => {
            let loader = ash::khr::win32_surface::Instance::new(&instance.entry, &instance.instance);
            let create_info = vk::Win32SurfaceCreateInfoKHR {
                hinstance: handle.hinstance.map(|hinstance| hinstance.get()).unwrap_or(0),
                hwnd: handle.hwnd.get(),
                ..Default::default()
            };
            unsafe { loader.create_win32_surface(&create_info, None) }
                .map_err(|e| SurfaceError::Backend(e.to_string()))
        }
        #[cfg(any(
            target_os = "linux",
            target_os = "freebsd",
            target_os = "netbsd",
            target_os = "openbsd"
        ))]
        (RawDisplayHandle::Wayland(display), RawWindowHandle::Wayland(window)) => {
            let loader =
                ash::khr::wayland_surface::Instance::new(&instance.entry, &instance.instance);
            let create_info = vk::WaylandSurfaceCreateInfoKHR {
                display: display.display.as_ptr(),
                surface: window.surface.as_ptr(),
                ..Default::default()
            };
            unsafe { loader.create_wayland_surface(&create_info, None) }
                .map_err(|e| SurfaceError::Backend(e.to_string()))
        }
        #[cfg(any(
            target_os = "linux",
            target_os = "freebsd",
            target_os = "netbsd",
            target_os = "openbsd"
        ))]
        (RawDisplayHandle::Xlib(display), RawWindowHandle::Xlib(window)) => {
            let loader = ash::khr::xlib_surface::Instance::new(&instance.entry, &instance.instance);
            let create_info = vk::XlibSurfaceCreateInfoKHR {
                dpy: display
                    .display
                    .map(|display| display.as_ptr())
                    .unwrap_or(std::ptr::null_mut()),
                window: window.window,
                ..Default::default()
            };
            unsafe { loader.create_xlib_surface(&create_info, None) }
                .map_err(|e| SurfaceError::Backend(e.to_string()))
        }
        #[cfg(target_os = "android")]
        (RawDisplayHandle::Android(_), RawWindowHandle::AndroidNdk(handle)) => {
            let loader =
                ash::khr::android_surface::Instance::new(&instance.entry, &instance.instance);
            let create_info = vk::AndroidSurfaceCreateInfoKHR {
                window: handle.a_native_window.as_ptr(),
                ..Default::default()
            };
            unsafe { loader.create_android_surface(&create_info, None) }
                .map_err(|e| SurfaceError::Backend(e.to_string()))
        }
        _ => Err(SurfaceError::UnsupportedHandle),
    }
}
