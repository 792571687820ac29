pub mod enums;
pub mod execute;
pub mod shell_info;
