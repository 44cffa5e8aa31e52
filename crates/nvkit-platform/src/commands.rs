/// Keeps spawned tool processes from flashing a console window on Windows.
///
/// nvm-windows is a console program, so without this flag every invocation
/// would open a visible terminal for the few hundred milliseconds the
/// process lives.
pub trait HideWindow {
    fn hide_window(&mut self) -> &mut Self;
}

#[cfg(windows)]
impl HideWindow for tokio::process::Command {
    fn hide_window(&mut self) -> &mut Self {
        use std::os::windows::process::CommandExt;

        // CREATE_NO_WINDOW from the Win32 process creation flags.
        self.creation_flags(0x0800_0000)
    }
}

#[cfg(not(windows))]
impl HideWindow for tokio::process::Command {
    fn hide_window(&mut self) -> &mut Self {
        self
    }
}
