// models.rs

use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::Value;

use crate::error::ApiError;

/// Generic envelope for eero API responses. Every response wraps its payload
/// in `{"meta": ..., "data": ...}`; `data` may be absent entirely for
/// action-style endpoints.
#[derive(Debug, Deserialize)]
#[serde(bound(deserialize = "T: serde::de::DeserializeOwned"))]
pub struct EeroResponse<T> {
    #[serde(default)]
    pub meta: ApiError,
    #[serde(default = "Option::default", deserialize_with = "lenient_data")]
    pub data: Option<T>,
}

/// A `data` field that is null, an empty object, or an empty array is never a
/// decode error, whatever the target type; a non-empty mismatch still is.
fn lenient_data<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: serde::Deserializer<'de>,
    T: serde::de::DeserializeOwned,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    let value = match value {
        None | Some(Value::Null) => return Ok(None),
        Some(value) => value,
    };

    let empty = matches!(&value, Value::Object(map) if map.is_empty())
        || matches!(&value, Value::Array(items) if items.is_empty());
    match serde_json::from_value(value) {
        Ok(decoded) => Ok(Some(decoded)),
        Err(_) if empty => Ok(None),
        Err(e) => Err(serde::de::Error::custom(e)),
    }
}

// --- Authentication ---

/// Response from POST /login. The user token is exchanged for an active
/// session once the verification code is submitted.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct LoginResponse {
    pub user_token: String,
}

// --- Account ---

/// The authenticated user's eero account, including the networks they can
/// access.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Account {
    pub name: String,
    pub phone: AccountPhone,
    pub email: AccountEmail,
    pub log_id: String,
    pub organization_id: Option<String>,
    pub image_assets: Value,
    pub networks: AccountNetworks,
    pub auth: AccountAuth,
    pub role: String,
    pub is_beta_bug_reporter_eligible: bool,
    pub can_transfer: bool,
    pub is_owner: bool,
    pub is_premium_capable: bool,
    pub payment_failed: bool,
    pub premium_status: String,
    pub premium_details: PremiumDetails,
    pub push_settings: PushSettings,
    pub trust_certificates_etag: String,
    pub consents: Consents,
    pub can_migrate_to_amazon_login: bool,
    pub eero_for_business: bool,
    pub mdu_program: bool,
    pub business_details: Value,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AccountEmail {
    pub value: String,
    pub verified: bool,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AccountPhone {
    pub value: String,
    pub country_code: String,
    pub national_number: String,
    pub verified: bool,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AccountNetworks {
    pub count: i64,
    pub data: Vec<NetworkSummary>,
}

/// Lightweight reference to a network inside the account payload. The `url`
/// field holds the full relative API path (e.g. "/2.2/networks/12345") and
/// should be passed verbatim to [`crate::EeroClient::get_network`] and
/// friends.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct NetworkSummary {
    pub url: String,
    pub name: String,
    pub created: Option<DateTime<Utc>>,
    pub nickname_label: Option<String>,
    pub access_expires_on: Option<DateTime<Utc>>,
    pub amazon_directed_id: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AccountAuth {
    #[serde(rename = "type")]
    pub kind: String,
    pub provider_id: Option<String>,
    pub service_id: Option<String>,
}

/// eero Plus/Secure subscription details.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct PremiumDetails {
    pub trial_ends: Option<DateTime<Utc>>,
    pub has_payment_info: bool,
    pub tier: String,
    pub subscribed_since: Option<DateTime<Utc>>,
    pub is_iap_customer: bool,
    pub payment_method: String,
    pub interval: String,
    pub next_billing_event_date: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct PushSettings {
    #[serde(rename = "networkOffline")]
    pub network_offline: bool,
    #[serde(rename = "nodeOffline")]
    pub node_offline: bool,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Consents {
    pub marketing_emails: MarketingEmailsConsent,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct MarketingEmailsConsent {
    pub consented: bool,
}

// --- Network ---

/// Full details of an eero network: name, operational status, node list and
/// the last measured speed.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct NetworkDetails {
    pub url: String,
    pub name: String,
    pub display_name: String,
    pub status: String,
    pub gateway: String,
    pub wan_ip: String,
    pub gateway_ip: String,
    pub connection: NetworkConnection,
    pub geo_ip: GeoIp,
    pub lease: NetworkLease,
    pub dhcp: NetworkDhcp,
    pub dns: NetworkDns,
    #[serde(rename = "upnp")]
    pub upnp_enabled: bool,
    pub ipv6_upstream: bool,
    #[serde(rename = "thread")]
    pub thread_enabled: bool,
    #[serde(rename = "sqm")]
    pub sqm_enabled: bool,
    pub band_steering: bool,
    pub wpa3: bool,
    pub wireless_mode: String,
    pub mlo_mode: String,
    pub eeros: NetworkEeros,
    pub speed: NetworkSpeed,
    pub timezone: NetworkTimezone,
    pub updates: NetworkUpdates,
    pub health: Health,
    pub ip_settings: IpSettings,
    pub premium_dns: PremiumDns,
    pub owner: String,
    pub premium_status: String,
    pub last_reboot: Option<DateTime<Utc>>,
    pub ipv6_lease: Ipv6Lease,
    pub ipv6: NetworkIpv6,
    pub guest_network: GuestNetwork,
    pub premium_details: NetworkPremiumDetails,
    pub wan_type: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct NetworkConnection {
    pub mode: String,
}

/// Geographical settings associated with the network's public IP.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct GeoIp {
    #[serde(rename = "countryCode")]
    pub country_code: String,
    #[serde(rename = "countryName")]
    pub country_name: String,
    pub city: String,
    pub region: String,
    pub timezone: String,
    #[serde(rename = "postalCode")]
    pub postal_code: String,
    #[serde(rename = "metroCode")]
    pub metro_code: i64,
    #[serde(rename = "areaCode")]
    pub area_code: Option<i64>,
    #[serde(rename = "regionName")]
    pub region_name: String,
    pub isp: String,
    pub org: String,
    pub asn: i64,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct NetworkLease {
    pub mode: String,
    pub dhcp: Option<LeaseDhcp>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct LeaseDhcp {
    pub ip: String,
    pub mask: String,
    pub router: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct NetworkDhcp {
    pub mode: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct NetworkDns {
    pub mode: String,
    pub parent: DnsParent,
    pub caching: bool,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct DnsParent {
    pub ips: Vec<String>,
}

/// Most recent speed test results for the network.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct NetworkSpeed {
    pub status: String,
    pub date: Option<DateTime<Utc>>,
    pub up: SpeedMeasurement,
    pub down: SpeedMeasurement,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct SpeedMeasurement {
    pub value: f64,
    pub units: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct NetworkTimezone {
    pub value: String,
    pub geo_ip: String,
}

/// Firmware update scheduling and availability.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct NetworkUpdates {
    pub preferred_update_hour: i64,
    pub min_required_firmware: String,
    pub target_firmware: String,
    pub update_to_firmware: String,
    pub update_required: bool,
    pub can_update_now: bool,
    pub has_update: bool,
    pub last_update_started: Option<DateTime<Utc>>,
    pub manifest_resource: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct GuestNetwork {
    pub url: String,
    pub name: String,
    pub enabled: bool,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct IpSettings {
    pub double_nat: bool,
    pub public_ip: String,
}

/// Whether eero Secure DNS filtering is currently in use.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct PremiumDns {
    pub dns_policies_enabled: bool,
    pub zscaler_location_enabled: bool,
    pub any_policies_enabled_for_network: bool,
    pub dns_policies: DnsPolicies,
    pub ad_block_settings: AdBlockSettings,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct DnsPolicies {
    pub block_malware: bool,
    pub ad_block: bool,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AdBlockSettings {
    pub enabled: bool,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct NetworkPremiumDetails {
    pub has_payment_info: bool,
    pub tier: String,
    pub payment_method: String,
    pub interval: String,
    pub is_my_subscription: bool,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Ipv6Lease {
    pub prefix: String,
    pub subnets: Vec<String>,
    pub name_servers: Vec<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct NetworkIpv6 {
    pub name_servers: Ipv6NameServers,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Ipv6NameServers {
    pub mode: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct NetworkEeros {
    pub count: i64,
    pub data: Vec<EeroNode>,
}

/// A single eero device (gateway or extender) in the mesh.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct EeroNode {
    pub url: String,
    pub serial: String,
    pub location: String,
    #[serde(deserialize_with = "crate::timestamp::lenient")]
    pub joined: Option<DateTime<Utc>>,
    pub gateway: bool,
    pub ip_address: String,
    pub status: String,
    pub model: String,
    pub model_number: String,
    pub ethernet_addresses: Vec<String>,
    pub wifi_bssids: Vec<String>,
    pub update_available: bool,
    pub os: String,
    pub os_version: String,
    pub mesh_quality_bars: i64,
    pub wired: bool,
    pub led_on: bool,
    pub using_wan: bool,
    pub is_primary_node: bool,
    pub mac_address: String,
    pub ipv6_addresses: Vec<Ipv6Address>,
    pub connected_clients_count: i64,
    pub heartbeat_ok: bool,
    pub last_heartbeat: Option<DateTime<Utc>>,
    pub connection_type: String,
    pub power_info: PowerInfo,
    pub bands: Vec<String>,
    pub provides_wifi: bool,
    pub state: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Ipv6Address {
    pub address: String,
    pub scope: String,
    pub interface: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct PowerInfo {
    pub power_source: String,
}

/// Overall network health indicators.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Health {
    pub internet: InternetHealth,
    pub eero_network: HealthDetail,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct InternetHealth {
    pub status: String,
    pub isp_up: bool,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct HealthDetail {
    pub status: String,
}

// --- Device ---

/// A client device connected to the eero network. Fields the API omits for
/// offline devices are optional so missing keys decode to None rather than
/// zero values.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Device {
    pub url: String,
    pub mac: String,
    pub nickname: Option<String>,
    pub hostname: Option<String>,
    pub display_name: Option<String>,
    pub ip: Option<String>,
    pub connection_type: Option<String>,
    pub connected: bool,
    pub wireless: bool,
    pub device_type: String,
    pub manufacturer: Option<String>,
    pub source: Option<DeviceSource>,
    pub last_active: Option<DateTime<Utc>>,
    pub profile: Option<DeviceRef>,
    pub usage: Option<Usage>,
    #[serde(rename = "frequency_band")]
    pub band: Option<String>,
}

/// Lightweight reference to a profile from within a device.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct DeviceRef {
    pub url: String,
    pub name: String,
}

/// The eero node this device is connected through.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct DeviceSource {
    pub location: String,
    pub is_gateway: bool,
    pub model: String,
    pub display_name: String,
    pub serial_number: String,
    pub url: String,
}

/// Bandwidth usage statistics for a device.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Usage {
    pub download: f64,
    pub upload: f64,
    pub units: String,
}

// --- Profile ---

/// A user profile (e.g. a family member) on the eero network.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Profile {
    pub url: String,
    pub name: String,
    pub paused: bool,
    pub device_count: i64,
    pub devices: Vec<Device>,
    pub block_apps: bool,
    #[serde(rename = "safe_search_enabled")]
    pub safe_search_active: bool,
    pub bedtime: Option<Schedule>,
}

/// A scheduled action (e.g. bedtime) on a profile.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Schedule {
    pub enabled: bool,
    pub time: String,
}
