use std::process::{Child, Command, Stdio};

/// Kills and reaps the child when dropped, so a failing test never leaves it running.
pub struct ChildGuard(pub Child);

impl ChildGuard {
    /// Spawns `program` with piped stdin/stdout and a silenced stderr.
    pub fn spawn_piped(program: &str, args: &[&str]) -> std::io::Result<Self> {
        Command::new(program)
            .args(args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .spawn()
            .map(ChildGuard)
    }

    pub fn id(&self) -> u32 {
        self.0.id()
    }

    pub fn is_running(&mut self) -> bool {
        matches!(self.0.try_wait(), Ok(None))
    }
}

impl Drop for ChildGuard {
    fn drop(&mut self) {
        if let Ok(Some(_)) = self.0.try_wait() {
            // already exited
            return;
        }
        let _ = self.0.kill();
        let _ = self.0.wait(); // reap zombie
    }
}
