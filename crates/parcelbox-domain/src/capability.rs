//! Role → capability lookup table.
//!
//! Every screen that restricts access names exactly one [`Capability`]; the roles allowed
//! on that screen are those whose capability set contains it. There is no role hierarchy:
//! a role has exactly the capabilities listed for it here.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::profile::{ParseEnumError, Role};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Capability {
    ViewAdminDashboard,
    ViewCustomerDashboard,
    ManageUsers,
    ManageLocations,
    ManageCustomers,
    ManageMail,
    ManageShipping,
    ProcessTasks,
    ManagePayments,
    ManageSubscriptions,
    ManageSupport,
    ManageSettings,
}

impl Capability {
    pub const ALL: [Capability; 12] = [
        Capability::ViewAdminDashboard,
        Capability::ViewCustomerDashboard,
        Capability::ManageUsers,
        Capability::ManageLocations,
        Capability::ManageCustomers,
        Capability::ManageMail,
        Capability::ManageShipping,
        Capability::ProcessTasks,
        Capability::ManagePayments,
        Capability::ManageSubscriptions,
        Capability::ManageSupport,
        Capability::ManageSettings,
    ];
}

const SUPER_ADMIN: &[Capability] = &Capability::ALL;

const ADMIN: &[Capability] = &[
    Capability::ViewAdminDashboard,
    Capability::ViewCustomerDashboard,
    Capability::ManageUsers,
    Capability::ManageLocations,
    Capability::ManageCustomers,
    Capability::ManageMail,
    Capability::ManageShipping,
    Capability::ProcessTasks,
    Capability::ManagePayments,
    Capability::ManageSubscriptions,
    Capability::ManageSupport,
];

const LOCATION_ADMIN: &[Capability] = &[
    Capability::ViewAdminDashboard,
    Capability::ViewCustomerDashboard,
    Capability::ManageMail,
    Capability::ManageShipping,
    Capability::ManageLocations,
    Capability::ManageCustomers,
    Capability::ProcessTasks,
];

const LOCATION_STAFF: &[Capability] = &[
    Capability::ViewCustomerDashboard,
    Capability::ManageMail,
    Capability::ManageShipping,
    Capability::ProcessTasks,
];

const CUSTOMER_SERVICE: &[Capability] = &[
    Capability::ViewCustomerDashboard,
    Capability::ManageCustomers,
    Capability::ManageSupport,
];

const CUSTOMER: &[Capability] = &[Capability::ViewCustomerDashboard];

impl Role {
    pub fn capabilities(self) -> &'static [Capability] {
        match self {
            Self::SuperAdmin => SUPER_ADMIN,
            Self::Admin => ADMIN,
            Self::LocationAdmin => LOCATION_ADMIN,
            Self::LocationStaff => LOCATION_STAFF,
            Self::CustomerService => CUSTOMER_SERVICE,
            Self::Customer => CUSTOMER,
        }
    }

    pub fn can(self, capability: Capability) -> bool {
        self.capabilities().contains(&capability)
    }

    /// Whether every capability of `other` is also held by `self`.
    pub fn covers(self, other: Role) -> bool {
        other.capabilities().iter().all(|c| self.can(*c))
    }
}

/// Explicit allow-list of roles holding `capability`.
pub fn roles_with(capability: Capability) -> Vec<Role> {
    Role::ALL.into_iter().filter(|r| r.can(capability)).collect()
}

/// Logical screens that restrict access.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Screen {
    AdminOverview,
    Mailbox,
    Shipping,
    Users,
    Payments,
    Subscriptions,
    Settings,
    CustomerDashboard,
}

impl Screen {
    pub const ALL: [Screen; 8] = [
        Screen::AdminOverview,
        Screen::Mailbox,
        Screen::Shipping,
        Screen::Users,
        Screen::Payments,
        Screen::Subscriptions,
        Screen::Settings,
        Screen::CustomerDashboard,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::AdminOverview => "admin_overview",
            Self::Mailbox => "mailbox",
            Self::Shipping => "shipping",
            Self::Users => "users",
            Self::Payments => "payments",
            Self::Subscriptions => "subscriptions",
            Self::Settings => "settings",
            Self::CustomerDashboard => "customer_dashboard",
        }
    }

    pub fn capability(self) -> Capability {
        match self {
            Self::AdminOverview => Capability::ViewAdminDashboard,
            Self::Mailbox => Capability::ManageMail,
            Self::Shipping => Capability::ManageShipping,
            Self::Users => Capability::ManageUsers,
            Self::Payments => Capability::ManagePayments,
            Self::Subscriptions => Capability::ManageSubscriptions,
            Self::Settings => Capability::ManageSettings,
            Self::CustomerDashboard => Capability::ViewCustomerDashboard,
        }
    }

    pub fn allowed_roles(self) -> Vec<Role> {
        roles_with(self.capability())
    }
}

impl FromStr for Screen {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|screen| screen.as_str() == s)
            .ok_or_else(|| ParseEnumError {
                kind: "screen",
                value: s.to_owned(),
            })
    }
}

/// Which dashboard the `dashboard` page renders for a role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Dashboard {
    Admin,
    Customer,
}

impl Dashboard {
    pub fn for_role(role: Role) -> Self {
        if role.is_admin() {
            Self::Admin
        } else {
            Self::Customer
        }
    }

    pub fn screen(self) -> Screen {
        match self {
            Self::Admin => Screen::AdminOverview,
            Self::Customer => Screen::CustomerDashboard,
        }
    }
}
