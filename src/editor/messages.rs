//! User-facing message catalog. Kept in one place so the frontend copy and
//! the test suite agree on exact strings. Validation and failure strings
//! live on `controller::EditError`.

pub const SUCCESS_REMOTE: &str = "Success! Image processed";
pub const SUCCESS_DEBUG_MODE: &str = "Success! Debug mode generated image";
pub const DEBUG_API_SKIPPED: &str = "Debug mode: API call skipped.";

pub const PROCESSING_REMOTE: &str = "Processing with AI...";
pub const PROCESSING_DEBUG: &str = "Processing (Debug)...";
pub const PROCESS_AI: &str = "Process with AI";
pub const PROCESS_DEBUG: &str = "Process (Debug)";

pub fn success_remote(original_size: u64) -> String {
    format!("{} ({} bytes)", SUCCESS_REMOTE, original_size)
}

pub fn success_debug(iteration: u32) -> String {
    format!("{} #{}", SUCCESS_DEBUG_MODE, iteration)
}

pub fn success_revert(index: usize, prompt: &str) -> String {
    format!("Reverted to image #{} - \"{}\"", index + 1, prompt)
}

