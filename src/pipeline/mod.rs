//! Analysis Pipeline Module
//!
//! ```text
//! STAGE 1: Request validation          (SiteProfile + measurements)
//! STAGE 2: Contaminant profile         (categories, limits, exceedances)
//! STAGE 3: Hydrogeology                (aquifer type -> parameters, once)
//! STAGE 4: Transport                   (one run per contaminant, blocking)
//! STAGE 5: Plume prediction            (per contaminant + summed field)
//! STAGE 6: Risk assessment
//! STAGE 7: Economics + remediation
//! STAGE 8: Alerts
//! ```
//!
//! Stage 4 is the only expensive one. Cancellation and the optional
//! deadline are honoured once per time step; a cancelled or failed run
//! never reaches stage 5.

mod analyzer;

pub use analyzer::{analyze_async, PollutionAnalyzer};
