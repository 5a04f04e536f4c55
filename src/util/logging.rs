// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
// http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Logging utilities
//!
//! The engine logs through the `log` facade: per-phase timings at debug level,
//! one summary line per join at info level. These helpers install `env_logger`
//! as the backend; `RUST_LOG` is honoured.

/// Initialize logging from the environment
///
/// Returns false if a logger was already installed.
pub fn init_logging() -> bool {
    env_logger::try_init().is_ok()
}

/// Initialize logging with a specific level, overriding `RUST_LOG`
pub fn init_logging_with_level(level: log::LevelFilter) -> bool {
    env_logger::Builder::from_default_env()
        .filter_level(level)
        .try_init()
        .is_ok()
}
