use std::{
    ffi::{
        CStr,
        CString,
    },
    os::raw::{
        c_char,
        c_void,
    },
    sync::Arc,
};

use ash::vk;
use log::{
    debug,
    error,
    info,
    warn,
};
use raw_window_handle::{
    RawDisplayHandle,
    RawWindowHandle,
};
use vetro_core::gpu;
use vetro_core::gpu::{
    InstanceCreateError,
    InstanceInfo,
    SurfaceError,
};

use super::*;

pub struct VkInstance {
    raw: Arc<RawVkInstance>,
    adapters: Vec<VkAdapter>,
}

impl VkInstance {
    pub fn new(info: &InstanceInfo) -> Result<Self, InstanceCreateError> {
        let entry: ash::Entry = unsafe { ash::Entry::load() }
            .map_err(|e| InstanceCreateError::DriverNotFound(e.to_string()))?;

        let extensions = unsafe { entry.enumerate_instance_extension_properties(None) }
            .map_err(|e| InstanceCreateError::Backend(e.to_string()))?;
        let layers = unsafe { entry.enumerate_instance_layer_properties() }
            .map_err(|e| InstanceCreateError::Backend(e.to_string()))?;

        let mut supports_khronos_validation = false;
        for layer in &layers {
            let name = unsafe { CStr::from_ptr(layer.layer_name.as_ptr()) };
            if name.to_str() == Ok("VK_LAYER_KHRONOS_validation") {
                supports_khronos_validation = true;
            }
        }

        let supported_extension_names: Vec<&CStr> = extensions
            .iter()
            .map(|extension| unsafe { CStr::from_ptr(extension.extension_name.as_ptr()) })
            .collect();
        let supports_extension =
            |name: &CStr| supported_extension_names.iter().any(|ext| *ext == name);
        let supports_debug_utils = supports_extension(ash::ext::debug_utils::NAME);

        let app_name = CString::new(info.app_name.as_str()).map_err(|_| {
            InstanceCreateError::Backend("application name contains a NUL byte".to_string())
        })?;

        let mut layer_names_c: Vec<CString> = Vec::new();
        if info.debug_layers {
            if supports_khronos_validation {
                layer_names_c.push(CString::new("VK_LAYER_KHRONOS_validation").unwrap());
            } else {
                warn!("Validation layers are not installed");
            }
        }
        let layer_names_ptr: Vec<*const c_char> = layer_names_c
            .iter()
            .map(|raw_name| raw_name.as_ptr())
            .collect();

        let mut wanted_extensions: Vec<&'static CStr> = vec![ash::khr::surface::NAME];
        #[cfg(target_os = "windows")]
        wanted_extensions.push(ash::khr::win32_surface::NAME);
        #[cfg(any(
            target_os = "linux",
            target_os = "freebsd",
            target_os = "netbsd",
            target_os = "openbsd"
        ))]
        {
            wanted_extensions.push(ash::khr::xlib_surface::NAME);
            wanted_extensions.push(ash::khr::wayland_surface::NAME);
        }
        #[cfg(any(target_os = "macos", target_os = "ios"))]
        wanted_extensions.push(ash::ext::metal_surface::NAME);
        #[cfg(target_os = "android")]
        wanted_extensions.push(ash::khr::android_surface::NAME);
        if supports_debug_utils {
            wanted_extensions.push(ash::ext::debug_utils::NAME);
        } else {
            debug!("Vulkan debug utils are unsupported");
        }

        let extension_names_ptr: Vec<*const c_char> = wanted_extensions
            .iter()
            .filter(|name| {
                let supported = supports_extension(name);
                if !supported {
                    debug!("Instance extension {:?} is unsupported", name);
                }
                supported
            })
            .map(|name| name.as_ptr())
            .collect();

        let app_info = vk::ApplicationInfo {
            api_version: vk::make_api_version(0, 1, 3, 0),
            application_version: vk::make_api_version(0, 0, 0, 1),
            engine_version: vk::make_api_version(0, 0, 0, 1),
            p_application_name: app_name.as_ptr(),
            p_engine_name: app_name.as_ptr(),
            ..Default::default()
        };

        let instance_create_info = vk::InstanceCreateInfo {
            p_application_info: &app_info,
            pp_enabled_layer_names: layer_names_ptr.as_ptr(),
            enabled_layer_count: layer_names_ptr.len() as u32,
            pp_enabled_extension_names: extension_names_ptr.as_ptr(),
            enabled_extension_count: extension_names_ptr.len() as u32,
            ..Default::default()
        };

        unsafe {
            let instance = entry
                .create_instance(&instance_create_info, None)
                .map_err(|e| match e {
                    vk::Result::ERROR_INCOMPATIBLE_DRIVER => {
                        InstanceCreateError::DriverNotFound(e.to_string())
                    }
                    _ => InstanceCreateError::Backend(e.to_string()),
                })?;

            let debug_utils = if supports_debug_utils {
                let debug_utils_instance = ash::ext::debug_utils::Instance::new(&entry, &instance);
                debug_utils_instance
                    .create_debug_utils_messenger(
                        &vk::DebugUtilsMessengerCreateInfoEXT {
                            flags: vk::DebugUtilsMessengerCreateFlagsEXT::empty(),
                            message_severity: vk::DebugUtilsMessageSeverityFlagsEXT::INFO
                                | vk::DebugUtilsMessageSeverityFlagsEXT::WARNING
                                | vk::DebugUtilsMessageSeverityFlagsEXT::ERROR,
                            message_type: vk::DebugUtilsMessageTypeFlagsEXT::GENERAL
                                | vk::DebugUtilsMessageTypeFlagsEXT::VALIDATION
                                | vk::DebugUtilsMessageTypeFlagsEXT::PERFORMANCE,
                            pfn_user_callback: Some(VkInstance::debug_callback),
                            p_user_data: std::ptr::null_mut(),
                            ..Default::default()
                        },
                        None,
                    )
                    .ok()
                    .map(|debug_messenger| RawInstanceVkDebugUtils {
                        debug_utils_instance: debug_utils_instance.clone(),
                        debug_messenger,
                    })
            } else {
                None
            };

            let surface_instance = ash::khr::surface::Instance::new(&entry, &instance);
            let raw = Arc::new(RawVkInstance {
                debug_utils,
                surface_instance,
                instance,
                entry,
            });

            let physical_devices: Vec<vk::PhysicalDevice> = raw
                .instance
                .enumerate_physical_devices()
                .map_err(|e| InstanceCreateError::Backend(e.to_string()))?;
            let adapters: Vec<VkAdapter> = physical_devices
                .into_iter()
                .map(|physical_device| VkAdapter::new(&raw, physical_device))
                .collect();
            info!("Vulkan instance with {} physical devices", adapters.len());

            Ok(VkInstance { raw, adapters })
        }
    }

    pub fn raw(&self) -> &Arc<RawVkInstance> {
        &self.raw
    }

    unsafe extern "system" fn debug_callback(
        message_severity: vk::DebugUtilsMessageSeverityFlagsEXT,
        message_types: vk::DebugUtilsMessageTypeFlagsEXT,
        p_callback_data: *const vk::DebugUtilsMessengerCallbackDataEXT<'_>,
        _p_user_data: *mut c_void,
    ) -> vk::Bool32 {
        let Some(callback_data) = (unsafe { p_callback_data.as_ref() }) else {
            return vk::FALSE;
        };
        let message = unsafe { CStr::from_ptr(callback_data.p_message) };

        if message_severity.contains(vk::DebugUtilsMessageSeverityFlagsEXT::ERROR) {
            error!("VK {:?}: {:?}", message_types, message);
        } else if message_severity.contains(vk::DebugUtilsMessageSeverityFlagsEXT::WARNING) {
            warn!("VK {:?}: {:?}", message_types, message);
        } else {
            debug!("VK {:?}: {:?}", message_types, message);
        }
        vk::FALSE
    }
}

impl gpu::Instance<VkBackend> for VkInstance {
    fn list_adapters(&self) -> &[VkAdapter] {
        &self.adapters
    }

    unsafe fn create_surface(
        &self,
        display_handle: RawDisplayHandle,
        window_handle: RawWindowHandle,
    ) -> Result<VkSurface, SurfaceError> {
        unsafe { VkSurface::new(&self.raw, display_handle, window_handle) }
    }
}
