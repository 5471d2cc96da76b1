//! Shared test harness modules for the gatemap CLI.

use super::*;

mod helpers;
