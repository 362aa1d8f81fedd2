//! Common test utilities and fixtures.

pub mod loader;
pub mod postgres;

#[allow(unused_imports)]
pub use loader::*;
#[allow(unused_imports)]
pub use postgres::*;

use std::path::{Path, PathBuf};

pub const TEAMS_CSV: &str = "\
id,firstName,lastName,isActive,employeeId,responseTimeHours,createdAt
101,Ada,Lovelace,true,7,1.5,2024-01-15T10:30:00Z
102,Grace,Hopper,false,8,2.25,2024-02-01T08:00:00Z
103,Alan,Turing,true,9,0.5,2024-03-10T12:45:00Z
";

pub const FAQS_CSV: &str = "\
id,question,answer,category
f1,Is data encrypted?,Yes at rest and in transit,\"[\"\"Security\"\"]\"
f2,Where is data stored?,In the EU,\"[\"\"Privacy\"\",\"\"Hosting\"\"]\"
";

/// Write `content` to `dir/name` and return the path.
#[allow(dead_code)]
pub fn write_csv(dir: &Path, name: &str, content: &str) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, content).expect("Failed to write CSV fixture");
    path
}
