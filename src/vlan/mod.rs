//! VLAN + macvlan provisioning: NetworkManager VLAN connection, optional host shim with boot
//! persistence, and a Docker macvlan network on top.
mod activate;
mod collect;
mod persist;
mod plan;
mod provision;

pub use activate::{wait_for_link_up, ActivationPolicy};
pub use collect::{collect_plan, describe_plan, VlanAnswers};
pub use persist::{persist_shim, render_shim_script, render_shim_unit, PersistPaths, ShimParams};
pub use plan::{ShimParent, ShimPlan, VlanPlan};
pub use provision::{
    Host, ProvisionOptions, ProvisionReport, Provisioner, STEP_ACTIVATION,
    STEP_CONNECTION, STEP_NETWORK, STEP_PERSIST, STEP_ROUTE, STEP_SHIM,
};
