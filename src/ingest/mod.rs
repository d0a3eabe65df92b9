// Input parsing — theme definitions and company HTML profiles.
//
// Both parsers follow the same shape: validate every record into a
// `Result`, log and collect the rejections, then embed what survived.

pub mod companies;
pub mod html;
pub mod themes;
