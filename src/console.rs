//! Line-oriented pendant console
//!
//! Each stdin line is one command:
//!
//! | Input          | Effect                                  |
//! |----------------|-----------------------------------------|
//! | `+` / `-`      | start a positive / negative jog session |
//! | `s` or empty   | stop jogging                            |
//! | `axis <name>`  | select an axis in the current mode      |
//! | `mode <name>`  | switch between joint, world, and tool   |
//! | `step <value>` | change the step size                    |
//! | `state`        | print the robot state                   |
//! | `help`         | list commands                           |
//! | `q`            | quit                                    |

use anyhow::{anyhow, bail};
use std::fmt::Write as _;
use std::sync::Arc;
use tokio::task::JoinHandle;

use vpendant_communication::PendantClient;
use vpendant_core::{
    AxisInfo, JogDirection, JogMode, JogSessionController, JogSettingsProvider, JointPosition,
    LiveJogSettings, RobotState, ScaraGeometry,
};

pub const HELP: &str = "\
commands:
  + / -         jog positive / negative until stopped
  s or <enter>  stop
  axis <name>   select axis (joint1..joint6, j1, x, y, z, rx, ry, rz)
  mode <name>   joint | world | tool
  step <value>  step size, 0.1 to 10
  state         show robot state
  q             quit";

/// A parsed console line
#[derive(Debug, Clone, PartialEq)]
pub enum ConsoleCommand {
    Jog(JogDirection),
    Stop,
    Axis(String),
    Mode(JogMode),
    Step(f64),
    State,
    Help,
    Quit,
}

impl ConsoleCommand {
    pub fn parse(line: &str) -> anyhow::Result<Self> {
        let mut words = line.split_whitespace();
        let Some(head) = words.next() else {
            return Ok(ConsoleCommand::Stop);
        };
        let arg = words.next();
        if words.next().is_some() {
            bail!("Too many arguments: {}", line.trim());
        }

        let command = match (head.to_lowercase().as_str(), arg) {
            ("+", None) => ConsoleCommand::Jog(JogDirection::Positive),
            ("-", None) => ConsoleCommand::Jog(JogDirection::Negative),
            ("s" | "stop", None) => ConsoleCommand::Stop,
            ("axis", Some(name)) => ConsoleCommand::Axis(name.to_string()),
            ("mode", Some(name)) => ConsoleCommand::Mode(name.parse()?),
            ("step", Some(value)) => ConsoleCommand::Step(
                value
                    .parse()
                    .map_err(|_| anyhow!("Step must be a number, got '{}'", value))?,
            ),
            ("state", None) => ConsoleCommand::State,
            ("help" | "?", None) => ConsoleCommand::Help,
            ("q" | "quit" | "exit", None) => ConsoleCommand::Quit,
            ("axis" | "mode" | "step", None) => bail!("'{}' needs a value", head),
            _ => bail!("Unknown command '{}', try 'help'", line.trim()),
        };
        Ok(command)
    }
}

/// Result of running one command
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Continue,
    Print(String),
    Quit,
}

/// Runs console commands against a controller and the pendant backend
pub struct Console {
    controller: Arc<JogSessionController>,
    settings: Arc<LiveJogSettings>,
    client: PendantClient,
    robot: u32,
    geometry: ScaraGeometry,
}

impl Console {
    pub fn new(
        controller: Arc<JogSessionController>,
        settings: Arc<LiveJogSettings>,
        client: PendantClient,
        robot: u32,
    ) -> Self {
        Self {
            controller,
            settings,
            client,
            robot,
            geometry: ScaraGeometry::default(),
        }
    }

    pub async fn execute(&self, command: ConsoleCommand) -> anyhow::Result<Outcome> {
        match command {
            ConsoleCommand::Jog(direction) => {
                self.controller.start(direction)?;
                Ok(Outcome::Continue)
            }
            ConsoleCommand::Stop => {
                self.controller.stop();
                Ok(Outcome::Continue)
            }
            ConsoleCommand::Axis(name) => {
                let info = self.settings.select_axis(&name)?;
                let client = self.client.clone();
                let robot = self.robot;
                let number = info.number;
                tokio::spawn(async move {
                    if let Err(err) = client.select_axis(number, robot).await {
                        tracing::warn!("Backend axis selection failed: {}", err);
                    }
                });
                Ok(Outcome::Print(format!("axis {}", info.display_name)))
            }
            ConsoleCommand::Mode(mode) => {
                self.settings.set_mode(mode);
                self.sync_backend()?;
                Ok(Outcome::Print(format!(
                    "mode {}, axis {}",
                    mode.display_name(),
                    self.settings.axis()
                )))
            }
            ConsoleCommand::Step(step) => {
                self.settings.set_step(step);
                if let Err(err) = vpendant_core::StepSize::new(step) {
                    return Ok(Outcome::Print(format!("warning: {}", err)));
                }
                Ok(Outcome::Continue)
            }
            ConsoleCommand::State => {
                let state = self.client.fetch_state().await?;
                Ok(Outcome::Print(self.describe(&state)))
            }
            ConsoleCommand::Help => Ok(Outcome::Print(HELP.to_string())),
            ConsoleCommand::Quit => Ok(Outcome::Quit),
        }
    }

    /// Send the current mode and axis to the backend in the background
    pub fn sync_backend(&self) -> anyhow::Result<JoinHandle<()>> {
        let mode = self.settings.mode();
        let axis = AxisInfo::lookup(mode, &self.settings.axis())?.number;
        let client = self.client.clone();
        let robot = self.robot;
        Ok(tokio::spawn(async move {
            if let Err(err) = client.sync_selection(mode, axis, robot).await {
                tracing::warn!("Backend mode/axis update failed: {}", err);
            }
        }))
    }

    /// Multi-line summary of a robot state report
    pub fn describe(&self, state: &RobotState) -> String {
        let mut out = String::new();
        let joints: Vec<String> = state
            .joint
            .iter()
            .enumerate()
            .map(|(i, v)| format!("J{}={:.3}", i + 1, v))
            .collect();
        let _ = writeln!(out, "joints: {}", joints.join(", "));
        let _ = writeln!(
            out,
            "xyz: X={:.3} Y={:.3} Z={:.3}  rot: Rx={:.3} Ry={:.3} Rz={:.3}",
            state.cartesian_value(0),
            state.cartesian_value(1),
            state.cartesian_value(2),
            state.cartesian_value(3),
            state.cartesian_value(4),
            state.cartesian_value(5),
        );

        let pose = self.geometry.forward(&JointPosition::from_slice(&state.joint));
        let _ = writeln!(
            out,
            "arm: elbow=({:.1}, {:.1}) tool=({:.1}, {:.1}) z={:.1} rot={:.1}{}",
            pose.elbow.x,
            pose.elbow.y,
            pose.tool.x,
            pose.tool.y,
            pose.z,
            pose.tool_rotation,
            if pose.within_reach(&self.geometry) {
                ""
            } else {
                " (out of reach)"
            }
        );

        let status = &state.status;
        let _ = write!(
            out,
            "status: mode={} ({}) axis={} jog={} power={}",
            status.jog_mode_text,
            status.jog_mode,
            status.selected_axis_label(),
            if status.allow_jog { "allowed" } else { "blocked" },
            status.power_state
        );
        if status.has_error() {
            let _ = write!(out, "\nerror: {}", status.error_desc);
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_jog_and_stop() {
        assert_eq!(
            ConsoleCommand::parse("+").unwrap(),
            ConsoleCommand::Jog(JogDirection::Positive)
        );
        assert_eq!(
            ConsoleCommand::parse(" - ").unwrap(),
            ConsoleCommand::Jog(JogDirection::Negative)
        );
        assert_eq!(ConsoleCommand::parse("").unwrap(), ConsoleCommand::Stop);
        assert_eq!(ConsoleCommand::parse("s").unwrap(), ConsoleCommand::Stop);
        assert_eq!(ConsoleCommand::parse("Q").unwrap(), ConsoleCommand::Quit);
    }

    #[test]
    fn test_parse_arguments() {
        assert_eq!(
            ConsoleCommand::parse("axis j3").unwrap(),
            ConsoleCommand::Axis("j3".to_string())
        );
        assert_eq!(
            ConsoleCommand::parse("mode cartesian").unwrap(),
            ConsoleCommand::Mode(JogMode::World)
        );
        assert_eq!(
            ConsoleCommand::parse("step 2.5").unwrap(),
            ConsoleCommand::Step(2.5)
        );
    }

    #[test]
    fn test_parse_errors() {
        assert!(ConsoleCommand::parse("step").is_err());
        assert!(ConsoleCommand::parse("step fast").is_err());
        assert!(ConsoleCommand::parse("mode free").is_err());
        assert!(ConsoleCommand::parse("+ 3").is_err());
        assert!(ConsoleCommand::parse("jump").is_err());
    }

    #[tokio::test]
    async fn test_describe_state() {
        use vpendant_core::{JogRequest, JogStopRequest, JogTransport, RobotStatus, TransportResult};

        struct Offline;

        #[async_trait::async_trait]
        impl JogTransport for Offline {
            async fn send_jog(&self, _request: JogRequest) -> TransportResult {
                Err(vpendant_core::TransportError::Cancelled)
            }
            async fn send_jog_stop(&self, _request: JogStopRequest) -> TransportResult {
                Err(vpendant_core::TransportError::Cancelled)
            }
        }

        let settings = Arc::new(LiveJogSettings::default());
        let controller = Arc::new(JogSessionController::new(settings.clone(), Arc::new(Offline)));
        let console = Console::new(
            controller,
            settings,
            PendantClient::new("http://127.0.0.1:9").unwrap(),
            1,
        );

        let state = RobotState {
            cartesian: vec![200.0, 0.0, 50.0, 0.0, 0.0, 0.0],
            joint: vec![0.0, 0.0, 50.0, 15.0],
            tool: vec![],
            status: RobotStatus {
                jog_mode: 1,
                jog_mode_text: "Joint".to_string(),
                selected_axis: 2,
                allow_jog: true,
                error_desc: "E-stop".to_string(),
                ..Default::default()
            },
        };
        let text = console.describe(&state);
        assert!(text.contains("J4=15.000"));
        assert!(text.contains("tool=(200.0, 0.0) z=50.0 rot=15.0"));
        assert!(text.contains("axis=J2"));
        assert!(text.ends_with("error: E-stop"));
    }
}
