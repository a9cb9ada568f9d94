use super::executor::{
    detect_windows_shell, CommandRunner, CommandSpec, Elevation, ExecutionResult, ProcessRunner,
};
use super::materializer::materialize;
use super::paths::BundleLayout;
use crate::common::error::ServiceError;
use crate::common::platform::Platform;
use crate::common::utils::discover_local_ipv4;
use crate::config::AppConfig;
use crate::logging;
use serde::Serialize;
use std::path::Path;
use std::sync::Arc;

/// The four service operations the UI can trigger
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ServiceOperation {
    AddService,
    DeleteService,
    RestartService,
    GetIp,
}

impl ServiceOperation {
    pub const ALL: [ServiceOperation; 4] = [
        ServiceOperation::AddService,
        ServiceOperation::DeleteService,
        ServiceOperation::RestartService,
        ServiceOperation::GetIp,
    ];

    /// Script base name, also used as the IPC command name
    pub fn as_str(self) -> &'static str {
        match self {
            ServiceOperation::AddService => "add_service",
            ServiceOperation::DeleteService => "delete_service",
            ServiceOperation::RestartService => "restart_service",
            ServiceOperation::GetIp => "get_ip",
        }
    }

    pub fn elevation(self) -> Elevation {
        match self {
            ServiceOperation::GetIp => Elevation::User,
            _ => Elevation::Admin,
        }
    }
}

/// Positional argument of a script, resolved right before execution
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScriptArg {
    /// Staged path of the bundled printer service executable
    ServiceBinary,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptDescriptor {
    pub operation: ServiceOperation,
    pub file_name: String,
    pub elevation: Elevation,
    pub args: Vec<ScriptArg>,
}

impl ScriptDescriptor {
    pub fn for_operation(operation: ServiceOperation, platform: Platform) -> Self {
        let args = match operation {
            ServiceOperation::AddService => vec![ScriptArg::ServiceBinary],
            _ => Vec::new(),
        };
        Self {
            operation,
            file_name: platform.script_file(operation.as_str()),
            elevation: operation.elevation(),
            args,
        }
    }
}

/// Owns everything needed to run service scripts for the lifetime of the app
pub struct ServiceController {
    platform: Platform,
    layout: BundleLayout,
    windows_shell: String,
    service_port: u16,
    runner: Arc<dyn CommandRunner>,
}

impl ServiceController {
    pub fn new(platform: Platform, layout: BundleLayout, runner: Arc<dyn CommandRunner>) -> Self {
        let windows_shell = detect_windows_shell(|p| platform.is_windows() && p.exists());
        Self {
            platform,
            layout,
            windows_shell,
            service_port: AppConfig::default().service_port,
            runner,
        }
    }

    pub fn from_config(
        config: &AppConfig,
        resource_dir: Option<&Path>,
    ) -> Result<Self, ServiceError> {
        let platform = Platform::current()?;
        let layout = BundleLayout::resolve(config, resource_dir);
        log::info!("Service scripts resolved from {:?}", layout.scripts_dir);
        Ok(Self::new(platform, layout, Arc::new(ProcessRunner))
            .with_service_port(config.service_port))
    }

    pub fn with_windows_shell(mut self, shell: impl Into<String>) -> Self {
        self.windows_shell = shell.into();
        self
    }

    pub fn with_service_port(mut self, port: u16) -> Self {
        self.service_port = port;
        self
    }

    pub fn platform(&self) -> Platform {
        self.platform
    }

    pub fn descriptor(&self, operation: ServiceOperation) -> ScriptDescriptor {
        ScriptDescriptor::for_operation(operation, self.platform)
    }

    /// Stage the script (and any bundled inputs) and build its command line
    pub fn command_for(&self, operation: ServiceOperation) -> Result<CommandSpec, ServiceError> {
        let descriptor = self.descriptor(operation);
        let script = materialize(&self.layout, &descriptor.file_name)?;

        let mut args = Vec::with_capacity(descriptor.args.len());
        for arg in &descriptor.args {
            match arg {
                ScriptArg::ServiceBinary => {
                    let binary = materialize(&self.layout, self.platform.service_binary())?;
                    args.push(binary.to_string_lossy().into_owned());
                }
            }
        }

        Ok(CommandSpec::for_script(
            self.platform,
            descriptor.elevation,
            &self.windows_shell,
            &script,
            &args,
        ))
    }

    /// Run one operation. Exactly one attempt; failures come back verbatim.
    pub async fn run(&self, operation: ServiceOperation) -> Result<String, ServiceError> {
        let name = operation.as_str();
        let spec = self.command_for(operation).map_err(|e| {
            log::error!("Cannot prepare {}: {}", name, e);
            e
        })?;

        log::info!("Running {} via {}", name, spec.program);
        let _ = logging::write_domain_log("service", &format!("Running {}", name));

        let outcome = self
            .runner
            .run(&spec)
            .await
            .and_then(ExecutionResult::into_output);

        match &outcome {
            Ok(stdout) => {
                log::info!("{} finished", name);
                let _ = logging::write_domain_log(
                    "service",
                    &format!("{} succeeded: {}", name, stdout.trim()),
                );
            }
            Err(e) => {
                log::error!("{} failed: {}", name, e);
                let _ = logging::write_domain_log("service", &format!("{} failed: {}", name, e));
            }
        }
        outcome
    }

    /// Host the printer service is reachable at: the first line printed by
    /// `get_ip`, or the discovered interface address when the script fails.
    pub async fn local_ip(&self) -> String {
        match self.run(ServiceOperation::GetIp).await {
            Ok(out) => {
                if let Some(line) = first_line(&out) {
                    return line.to_string();
                }
                log::warn!("get_ip printed nothing, discovering address from interfaces");
            }
            Err(e) => {
                log::warn!("get_ip failed ({}), discovering address from interfaces", e);
            }
        }

        let ip = discover_local_ipv4();
        if self.service_port == 80 {
            ip.to_string()
        } else {
            format!("{}:{}", ip, self.service_port)
        }
    }
}

fn first_line(output: &str) -> Option<&str> {
    output.lines().map(str::trim).find(|l| !l.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::service::executor::testing::RecordingRunner;
    use crate::service::executor::LEGACY_POWERSHELL;
    use rstest::rstest;
    use std::fs;
    use tempfile::TempDir;

    struct Fixture {
        _bundle: TempDir,
        staging: TempDir,
        runner: Arc<RecordingRunner>,
        controller: ServiceController,
    }

    fn fixture(platform: Platform, runner: RecordingRunner) -> Fixture {
        let bundle = TempDir::new().unwrap();
        let staging = TempDir::new().unwrap();
        for op in ServiceOperation::ALL {
            fs::write(bundle.path().join(platform.script_file(op.as_str())), "exit 0\n").unwrap();
        }
        fs::write(bundle.path().join(platform.service_binary()), b"\x7fELF").unwrap();

        let runner = Arc::new(runner);
        let layout = BundleLayout::new(bundle.path().to_path_buf(), staging.path().to_path_buf());
        let controller = ServiceController::new(platform, layout, runner.clone())
            .with_windows_shell(LEGACY_POWERSHELL);
        Fixture {
            _bundle: bundle,
            staging,
            runner,
            controller,
        }
    }

    #[test]
    fn test_only_get_ip_runs_unelevated() {
        for op in ServiceOperation::ALL {
            let expected = if op == ServiceOperation::GetIp {
                Elevation::User
            } else {
                Elevation::Admin
            };
            assert_eq!(op.elevation(), expected, "{}", op.as_str());
        }
    }

    #[test]
    fn test_descriptors_per_platform() {
        let add = ScriptDescriptor::for_operation(ServiceOperation::AddService, Platform::Windows);
        assert_eq!(add.file_name, "add_service.ps1");
        assert_eq!(add.args, vec![ScriptArg::ServiceBinary]);

        let restart =
            ScriptDescriptor::for_operation(ServiceOperation::RestartService, Platform::Linux);
        assert_eq!(restart.file_name, "restart_service.sh");
        assert!(restart.args.is_empty());
    }

    #[rstest]
    fn test_dispatch_matrix(
        #[values(Platform::Windows, Platform::Linux, Platform::MacOs)] platform: Platform,
        #[values(
            ServiceOperation::AddService,
            ServiceOperation::DeleteService,
            ServiceOperation::RestartService,
            ServiceOperation::GetIp
        )]
        op: ServiceOperation,
    ) {
        let fx = fixture(platform, RecordingRunner::succeeding(""));
        let spec = fx.controller.command_for(op).unwrap();
        let script = fx.staging.path().join(platform.script_file(op.as_str()));
        let script = script.to_string_lossy().into_owned();

        let expected_program = match (platform, op.elevation()) {
            (Platform::Windows, _) => LEGACY_POWERSHELL,
            (Platform::Linux, Elevation::Admin) => "pkexec",
            (Platform::MacOs, Elevation::Admin) => "osascript",
            (_, Elevation::User) => "bash",
        };
        assert_eq!(spec.program, expected_program);

        let mentions_script = spec.args.iter().any(|a| a.contains(&script));
        assert!(mentions_script, "{:?} missing {}", spec.args, script);

        let binary = fx.staging.path().join(platform.service_binary());
        let binary = binary.to_string_lossy().into_owned();
        let mentions_binary = spec.args.iter().any(|a| a.contains(&binary));
        assert_eq!(mentions_binary, op == ServiceOperation::AddService);
    }

    #[tokio::test]
    async fn test_add_service_on_linux_uses_pkexec_with_staged_binary() {
        let fx = fixture(Platform::Linux, RecordingRunner::succeeding("registered\n"));

        let out = fx.controller.run(ServiceOperation::AddService).await.unwrap();
        assert_eq!(out, "registered\n");

        let script = fx.staging.path().join("add_service.sh");
        let binary = fx.staging.path().join("main");
        assert_eq!(
            fx.runner.calls(),
            vec![CommandSpec {
                program: "pkexec".into(),
                args: vec![
                    "bash".into(),
                    script.to_string_lossy().into_owned(),
                    binary.to_string_lossy().into_owned(),
                ],
            }]
        );
        assert_eq!(fs::read(&binary).unwrap(), b"\x7fELF");
    }

    #[tokio::test]
    async fn test_missing_script_fails_before_spawning() {
        let fx = fixture(Platform::Linux, RecordingRunner::succeeding(""));
        fs::remove_file(fx._bundle.path().join("delete_service.sh")).unwrap();

        let err = fx
            .controller
            .run(ServiceOperation::DeleteService)
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::ScriptNotFound(_)));
        assert!(fx.runner.calls().is_empty());
    }

    #[tokio::test]
    async fn test_missing_service_binary_fails_add_service() {
        let fx = fixture(Platform::MacOs, RecordingRunner::succeeding(""));
        fs::remove_file(fx._bundle.path().join("main")).unwrap();

        let err = fx.controller.run(ServiceOperation::AddService).await.unwrap_err();
        assert!(matches!(err, ServiceError::ScriptNotFound(p) if p.ends_with("main")));
        assert!(fx.runner.calls().is_empty());
    }

    #[tokio::test]
    async fn test_script_failure_surfaces_stderr() {
        let fx = fixture(
            Platform::Linux,
            RecordingRunner::failing("Request dismissed\n", 126),
        );
        let err = fx
            .controller
            .run(ServiceOperation::RestartService)
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Request dismissed\n");
        assert_eq!(fx.runner.calls().len(), 1);
    }

    #[tokio::test]
    async fn test_local_ip_uses_first_script_line() {
        let fx = fixture(
            Platform::Linux,
            RecordingRunner::succeeding("\n  192.168.1.50:8089  \nextra\n"),
        );
        assert_eq!(fx.controller.local_ip().await, "192.168.1.50:8089");
        assert_eq!(fx.runner.calls()[0].program, "bash");
    }

    #[tokio::test]
    async fn test_local_ip_falls_back_to_interfaces() {
        let fx = fixture(Platform::Linux, RecordingRunner::failing("", 1));
        let ip = fx.controller.local_ip().await;
        assert!(ip.ends_with(":8089"), "{}", ip);
        assert_eq!(ip, format!("{}:8089", discover_local_ipv4()));
    }
}
