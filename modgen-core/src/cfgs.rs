//! Single interface for registering all of the [`Config`]s used by a generation run.
//!
//! [`Config`]: modgen_cfg::Config

use modgen_cfg::ConfigSetBuilder;

pub fn all_cfgs(builder: &mut ConfigSetBuilder) {
    crate::defs::register_configs(builder);
}
