//! One wrapped invocation, end to end

use crate::config::MixpathConfig;
use crate::error::Result;
use crate::fs::{FileSystem, RealFileSystem};
use crate::process::ToolCommand;
use crate::rewrite::PathRewriter;
use crate::umbrella::{build_app_dictionary, select_mode, AppDictionary, ManifestLocator, Mode};
use std::ffi::OsString;
use std::io::{self, BufRead, Write};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info};

pub struct Runner {
    config: MixpathConfig,
    fs: Arc<dyn FileSystem>,
}

impl Runner {
    pub fn new(config: MixpathConfig) -> Self {
        Self::with_fs(config, Arc::new(RealFileSystem::new()))
    }

    pub fn with_fs(config: MixpathConfig, fs: Arc<dyn FileSystem>) -> Self {
        Self { config, fs }
    }

    pub fn mode(&self) -> Result<Mode> {
        select_mode(self.fs.as_ref(), &self.config.apps_dir)
    }

    /// Locates every app manifest and reads them into a dictionary
    pub async fn build_dictionary(&self) -> Result<AppDictionary> {
        let start = Instant::now();
        let manifests = ManifestLocator::new(
            self.fs.as_ref(),
            &self.config.apps_dir,
            &self.config.manifest,
        )
        .locate()?;

        let dictionary = build_app_dictionary(Arc::clone(&self.fs), manifests).await?;
        info!(
            apps = dictionary.len(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "App dictionary ready"
        );

        Ok(dictionary)
    }

    /// Runs the tool with `args` and returns whether it succeeded.
    ///
    /// In umbrella mode the rewritten output goes to `stdout`; in passthrough
    /// mode the tool writes to the inherited streams directly.
    pub async fn run<W: Write>(&self, args: Vec<OsString>, stdout: W) -> Result<bool> {
        let tool = ToolCommand::new(self.config.tool.clone(), args);

        match self.mode()? {
            Mode::Passthrough => {
                let status = tool.passthrough().await?;
                Ok(status.success())
            }
            Mode::Umbrella => {
                let dictionary = self.build_dictionary().await?;
                let captured = tool.capture_combined().await?;

                let lines =
                    PathRewriter::new(&dictionary).rewrite(captured.output.as_slice(), stdout)?;
                debug!(lines, success = captured.success(), "Rewrote tool output");

                Ok(captured.success())
            }
        }
    }

    /// Filter mode: rewrites `input` instead of running the tool
    pub async fn filter<R: BufRead, W: Write>(
        &self,
        mut input: R,
        mut output: W,
    ) -> Result<bool> {
        match self.mode()? {
            Mode::Passthrough => {
                io::copy(&mut input, &mut output)?;
                output.flush()?;
            }
            Mode::Umbrella => {
                let dictionary = self.build_dictionary().await?;
                let lines = PathRewriter::new(&dictionary).rewrite(input, output)?;
                debug!(lines, "Rewrote input");
            }
        }
        Ok(true)
    }
}
