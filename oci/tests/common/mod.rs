//! Shared fixtures for acceptance tests: a mocked control plane that serves
//! the full lifecycle of the compute scenario

use serde_json::json;
use tfacc::types::{AttributePath, DynamicValue};

pub const COMPARTMENT_ID: &str = "ocid1.compartment.oc1..acctest";
pub const AD_NAME: &str = "Uocm:PHX-AD-1";
pub const VCN_ID: &str = "ocid1.vcn.oc1.phx.acctest";
pub const ROUTE_TABLE_ID: &str = "ocid1.routetable.oc1.phx.acctest";
pub const SECURITY_LIST_ID: &str = "ocid1.securitylist.oc1.phx.acctest";
pub const DHCP_OPTIONS_ID: &str = "ocid1.dhcpoptions.oc1.phx.acctest";
pub const SUBNET_ID: &str = "ocid1.subnet.oc1.phx.acctest";
pub const IMAGE_ID: &str = "ocid1.image.oc1.phx.acctest";
pub const INSTANCE_ID: &str = "ocid1.instance.oc1.phx.acctest";
pub const SSH_PUBLIC_KEY: &str = "ssh-rsa AAAA acceptance";

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
}

pub fn provider_config(endpoint: &str) -> DynamicValue {
    let mut config = DynamicValue::empty_map();
    config
        .set_string(&AttributePath::new("endpoint"), endpoint.to_string())
        .unwrap();
    config
        .set_string(&AttributePath::new("auth_token"), "test-token".to_string())
        .unwrap();
    config
}

pub fn vcn_body(display_name: &str) -> serde_json::Value {
    json!({
        "id": VCN_ID,
        "cidrBlock": "10.0.0.0/16",
        "compartmentId": COMPARTMENT_ID,
        "displayName": display_name,
        "lifecycleState": "AVAILABLE",
        "defaultRouteTableId": ROUTE_TABLE_ID,
        "defaultSecurityListId": SECURITY_LIST_ID,
        "defaultDhcpOptionsId": DHCP_OPTIONS_ID
    })
}

pub fn subnet_body() -> serde_json::Value {
    json!({
        "id": SUBNET_ID,
        "availabilityDomain": AD_NAME,
        "cidrBlock": "10.0.1.0/24",
        "compartmentId": COMPARTMENT_ID,
        "vcnId": VCN_ID,
        "displayName": "-tf-subnet",
        "lifecycleState": "AVAILABLE",
        "routeTableId": ROUTE_TABLE_ID,
        "securityListIds": [SECURITY_LIST_ID],
        "dhcpOptionsId": DHCP_OPTIONS_ID
    })
}

pub fn image_body() -> serde_json::Value {
    json!({
        "id": IMAGE_ID,
        "displayName": "Oracle-Linux-7.3-2017.04.18-0",
        "operatingSystem": "Oracle Linux",
        "operatingSystemVersion": "7.3",
        "lifecycleState": "AVAILABLE"
    })
}

pub fn instance_body() -> serde_json::Value {
    json!({
        "id": INSTANCE_ID,
        "availabilityDomain": AD_NAME,
        "compartmentId": COMPARTMENT_ID,
        "displayName": "-tf-instance",
        "imageId": IMAGE_ID,
        "shape": "VM.Standard1.1",
        "region": "phx",
        "lifecycleState": "RUNNING",
        "ipxeScript": "#!ipxe\nchain http://boot.local/boot.ipxe",
        "metadata": {"ssh_authorized_keys": SSH_PUBLIC_KEY}
    })
}

/// Register mocks for the whole compute scenario on an already started
/// server: availability domains, VCN, subnet, image listing, instance
/// lifecycle and the instances listing.
pub async fn mock_control_plane(server: &mut mockito::ServerGuard) {
    server
        .mock(
            "GET",
            format!("/20160918/availabilityDomains?compartmentId={COMPARTMENT_ID}").as_str(),
        )
        .with_status(200)
        .with_body(json!([{"name": AD_NAME, "compartmentId": COMPARTMENT_ID}]).to_string())
        .create_async()
        .await;

    server
        .mock("POST", "/20160918/vcns")
        .with_status(200)
        .with_body(vcn_body("-tf-vcn").to_string())
        .create_async()
        .await;
    server
        .mock("GET", format!("/20160918/vcns/{VCN_ID}").as_str())
        .with_status(200)
        .with_body(vcn_body("-tf-vcn").to_string())
        .create_async()
        .await;
    server
        .mock("DELETE", format!("/20160918/vcns/{VCN_ID}").as_str())
        .with_status(204)
        .create_async()
        .await;

    server
        .mock("POST", "/20160918/subnets")
        .with_status(200)
        .with_body(subnet_body().to_string())
        .create_async()
        .await;
    server
        .mock("GET", format!("/20160918/subnets/{SUBNET_ID}").as_str())
        .with_status(200)
        .with_body(subnet_body().to_string())
        .create_async()
        .await;
    server
        .mock("DELETE", format!("/20160918/subnets/{SUBNET_ID}").as_str())
        .with_status(204)
        .create_async()
        .await;

    server
        .mock(
            "GET",
            format!(
                "/20160918/images?compartmentId={COMPARTMENT_ID}\
                 &operatingSystem=Oracle%20Linux&operatingSystemVersion=7.3&limit=1"
            )
            .as_str(),
        )
        .with_status(200)
        .with_body(json!([image_body()]).to_string())
        .create_async()
        .await;

    server
        .mock("POST", "/20160918/instances")
        .with_status(200)
        .with_body(instance_body().to_string())
        .create_async()
        .await;
    server
        .mock("GET", format!("/20160918/instances/{INSTANCE_ID}").as_str())
        .with_status(200)
        .with_body(instance_body().to_string())
        .create_async()
        .await;
    server
        .mock(
            "DELETE",
            format!("/20160918/instances/{INSTANCE_ID}").as_str(),
        )
        .with_status(204)
        .create_async()
        .await;

    server
        .mock(
            "GET",
            format!(
                "/20160918/instances?compartmentId={COMPARTMENT_ID}\
                 &availabilityDomain=Uocm%3APHX-AD-1&limit=1"
            )
            .as_str(),
        )
        .with_status(200)
        .with_body(json!([instance_body()]).to_string())
        .create_async()
        .await;
}
