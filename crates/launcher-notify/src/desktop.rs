//! Native desktop notifications.

use std::process::{Command, Stdio};

use tracing::{debug, warn};

use launcher_protocols::Notifier;

/// Shows notifications through the platform's notification tool.
///
/// Delivery runs on a detached thread; the caller never waits and failures
/// are only logged.
#[derive(Debug, Clone)]
pub struct DesktopNotifier {
    app_name: String,
}

impl DesktopNotifier {
    pub fn new(app_name: impl Into<String>) -> Self {
        Self {
            app_name: app_name.into(),
        }
    }
}

/// Program and arguments that display one notification on this platform,
/// or `None` where no tool is known.
pub fn desktop_command(app_name: &str, title: &str, body: &str) -> Option<(String, Vec<String>)> {
    let title = if title.is_empty() { app_name } else { title };

    if cfg!(target_os = "macos") {
        let script = format!(
            r#"display notification "{}" with title "{}""#,
            escape_quoted(body),
            escape_quoted(title)
        );
        Some(("osascript".to_string(), vec!["-e".to_string(), script]))
    } else if cfg!(target_os = "windows") {
        let script = format!(
            "[void][System.Reflection.Assembly]::LoadWithPartialName('System.Windows.Forms'); \
             $n = New-Object System.Windows.Forms.NotifyIcon; \
             $n.Icon = [System.Drawing.SystemIcons]::Information; \
             $n.Visible = $true; \
             $n.ShowBalloonTip(5000, '{}', '{}', 'Info'); \
             Start-Sleep -Seconds 6; $n.Dispose()",
            title.replace('\'', "''"),
            body.replace('\'', "''")
        );
        Some((
            "powershell".to_string(),
            vec!["-NoProfile".to_string(), "-Command".to_string(), script],
        ))
    } else if cfg!(unix) {
        Some((
            "notify-send".to_string(),
            vec![
                "--app-name".to_string(),
                app_name.to_string(),
                title.to_string(),
                body.to_string(),
            ],
        ))
    } else {
        None
    }
}

fn escape_quoted(value: &str) -> String {
    value.replace('\\', "\\\\").replace('"', r#"\""#)
}

impl Notifier for DesktopNotifier {
    fn notify(&self, title: &str, body: &str) {
        let Some((program, args)) = desktop_command(&self.app_name, title, body) else {
            debug!("Desktop notifications not supported on this platform");
            return;
        };

        let spawned = std::thread::Builder::new()
            .name("desktop-notify".to_string())
            .spawn(move || {
                match Command::new(&program)
                    .args(&args)
                    .stdin(Stdio::null())
                    .output()
                {
                    Ok(output) if output.status.success() => {
                        debug!("Desktop notification sent via {}", program);
                    }
                    Ok(output) => warn!(
                        "Failed to send desktop notification: {}",
                        String::from_utf8_lossy(&output.stderr).trim()
                    ),
                    Err(e) => warn!("Failed to send desktop notification via {}: {}", program, e),
                }
            });

        if let Err(e) = spawned {
            warn!("Failed to start notification thread: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[cfg(all(unix, not(target_os = "macos")))]
    #[test]
    fn test_notify_send_command() {
        let (program, args) = desktop_command("CC Launcher", "Schedule: P", "make - failed (3s)").unwrap();
        assert_eq!(program, "notify-send");
        assert_eq!(args, vec!["--app-name", "CC Launcher", "Schedule: P", "make - failed (3s)"]);
    }

    #[cfg(target_os = "macos")]
    #[test]
    fn test_osascript_command_escapes_quotes() {
        let (program, args) = desktop_command("CC Launcher", "Schedule: P", "echo \"x\"").unwrap();
        assert_eq!(program, "osascript");
        assert!(args[1].contains(r#"echo \"x\""#));
        assert!(args[1].contains(r#"with title "Schedule: P""#));
    }

    #[cfg(unix)]
    #[test]
    fn test_empty_title_uses_app_name() {
        let (_, args) = desktop_command("CC Launcher", "", "body").unwrap();
        assert!(args.iter().any(|a| a.contains("CC Launcher")));
    }

    #[test]
    fn test_escape_quoted() {
        assert_eq!(escape_quoted(r#"a "b" \c"#), r#"a \"b\" \\c"#);
    }
}
