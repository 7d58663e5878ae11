use nix::{ioctl_read, ioctl_readwrite};

// struct gpiochip_info
#[repr(C)]
pub(crate) struct gpio_chip_info {
    pub(crate) name: [u8; super::v2::GPIO_MAX_NAME_SIZE],
    pub(crate) label: [u8; super::v2::GPIO_MAX_NAME_SIZE],
    pub(crate) lines: u32,
}

impl gpio_chip_info {
    pub const fn zeroed() -> Self {
        Self {
            name: [0; super::v2::GPIO_MAX_NAME_SIZE],
            label: [0; super::v2::GPIO_MAX_NAME_SIZE],
            lines: 0,
        }
    }
}

ioctl_read!(gpio_get_chipinfo, 0xB4, 0x01, gpio_chip_info);

// GPIO_V2_GET_LINEINFO_UNWATCH_IOCTL takes a plain u32 offset in, and returns
// the same offset; the kernel reuses the watch opcode's struct-free shape.
ioctl_readwrite!(gpio_get_lineinfo_unwatch, 0xB4, 0x0C, u32);
