//! Acceptance scenario for the oci_core_instances data source
//!
//! Builds the full dependency chain the listing needs - VCN, subnet sized
//! from the VCN defaults, an Oracle Linux 7.3 image lookup and a
//! VM.Standard1.1 instance - then lists instances in the availability
//! domain and asserts over the single returned row.

mod common;

use oci::OciProvider;
use std::collections::HashMap;
use tfacc::scenario::{
    self, check_attr, check_attr_set, BlockBuilder, ConfigBuilder, ScenarioConfig, TestCase,
    TestStep,
};
use tfacc::types::Dynamic;
use tfacc::TfaccError;

fn compute_scenario_config() -> ScenarioConfig {
    ConfigBuilder::new()
        .variable("compartment_id", common::COMPARTMENT_ID)
        .variable("ssh_public_key", common::SSH_PUBLIC_KEY)
        .data(
            "oci_identity_availability_domains",
            "ADs",
            BlockBuilder::new().attr("compartment_id", "${var.compartment_id}"),
        )
        .resource(
            "oci_core_virtual_network",
            "t",
            BlockBuilder::new()
                .attr("cidr_block", "10.0.0.0/16")
                .attr("compartment_id", "${var.compartment_id}")
                .attr("display_name", "-tf-vcn"),
        )
        .resource(
            "oci_core_subnet",
            "t",
            BlockBuilder::new()
                .attr(
                    "availability_domain",
                    "${lookup(data.oci_identity_availability_domains.ADs.availability_domains[0], \"name\")}",
                )
                .attr("cidr_block", "10.0.1.0/24")
                .attr("display_name", "-tf-subnet")
                .attr("compartment_id", "${var.compartment_id}")
                .attr("vcn_id", "${oci_core_virtual_network.t.id}")
                .attr(
                    "route_table_id",
                    "${oci_core_virtual_network.t.default_route_table_id}",
                )
                .attr(
                    "security_list_ids",
                    vec![Dynamic::from(
                        "${oci_core_virtual_network.t.default_security_list_id}",
                    )],
                )
                .attr(
                    "dhcp_options_id",
                    "${oci_core_virtual_network.t.default_dhcp_options_id}",
                ),
        )
        .data(
            "oci_core_images",
            "t",
            BlockBuilder::new()
                .attr("compartment_id", "${var.compartment_id}")
                .attr("operating_system", "Oracle Linux")
                .attr("operating_system_version", "7.3")
                .attr("limit", 1),
        )
        .resource(
            "oci_core_instance",
            "t",
            BlockBuilder::new()
                .attr(
                    "availability_domain",
                    "${lookup(data.oci_identity_availability_domains.ADs.availability_domains[0], \"name\")}",
                )
                .attr("compartment_id", "${var.compartment_id}")
                .attr("display_name", "-tf-instance")
                .attr("image", "${oci_core_images.t.images.0.id}")
                .attr("shape", "VM.Standard1.1")
                .attr("subnet_id", "${oci_core_subnet.t.id}")
                .attr(
                    "metadata",
                    HashMap::from([(
                        "ssh_authorized_keys".to_string(),
                        Dynamic::from("${var.ssh_public_key}"),
                    )]),
                )
                .attr(
                    "timeouts",
                    HashMap::from([("create".to_string(), Dynamic::from("15m"))]),
                ),
        )
        .data(
            "oci_core_instances",
            "inst_read",
            BlockBuilder::new()
                .attr(
                    "availability_domain",
                    "${lookup(data.oci_identity_availability_domains.ADs.availability_domains[0], \"name\")}",
                )
                .attr("compartment_id", "${var.compartment_id}")
                .attr("limit", 1),
        )
        .build()
}

#[tokio::test]
async fn lists_the_launched_instance() {
    common::init_tracing();
    let mut server = mockito::Server::new_async().await;
    common::mock_control_plane(&mut server).await;

    let listing = "oci_core_instances.inst_read";
    let case = TestCase::new()
        .step(
            TestStep::new(compute_scenario_config())
                .import_state(true)
                .check(check_attr_set(listing, "availability_domain"))
                .check(check_attr(listing, "instances.#", "1"))
                .check(check_attr(listing, "instances.0.id", common::INSTANCE_ID))
                .check(check_attr_set(listing, "instances.0.display_name"))
                .check(check_attr_set(listing, "instances.0.region"))
                .check(check_attr(listing, "instances.0.state", "RUNNING"))
                .check(check_attr(listing, "instances.0.shape", "VM.Standard1.1"))
                .check(check_attr(listing, "instances.0.image", common::IMAGE_ID))
                .check(check_attr_set(listing, "instances.0.ipxe_script"))
                .check(check_attr_set(listing, "instances.0.metadata")),
        )
        .prevent_post_destroy_refresh();

    let mut provider = OciProvider::new();
    scenario::run(&mut provider, common::provider_config(&server.url()), case)
        .await
        .unwrap();
}

#[tokio::test]
async fn subnet_is_wired_to_the_vcn_defaults() {
    common::init_tracing();
    let mut server = mockito::Server::new_async().await;
    common::mock_control_plane(&mut server).await;

    let case = TestCase::new()
        .step(
            TestStep::new(compute_scenario_config())
                .check(check_attr(
                    "oci_core_subnet.t",
                    "route_table_id",
                    common::ROUTE_TABLE_ID,
                ))
                .check(check_attr(
                    "oci_core_subnet.t",
                    "security_list_ids.#",
                    "1",
                ))
                .check(check_attr(
                    "oci_core_subnet.t",
                    "security_list_ids.0",
                    common::SECURITY_LIST_ID,
                ))
                .check(check_attr(
                    "oci_core_subnet.t",
                    "availability_domain",
                    common::AD_NAME,
                )),
        )
        .prevent_post_destroy_refresh();

    let mut provider = OciProvider::new();
    scenario::run(&mut provider, common::provider_config(&server.url()), case)
        .await
        .unwrap();
}

#[tokio::test]
async fn import_verify_catches_a_drifted_vcn() {
    common::init_tracing();
    let mut server = mockito::Server::new_async().await;

    server
        .mock("POST", "/20160918/vcns")
        .with_status(200)
        .with_body(common::vcn_body("-tf-vcn").to_string())
        .create_async()
        .await;
    // Subsequent reads report a different display name than the create did
    server
        .mock(
            "GET",
            format!("/20160918/vcns/{}", common::VCN_ID).as_str(),
        )
        .with_status(200)
        .with_body(common::vcn_body("-tf-vcn-drifted").to_string())
        .create_async()
        .await;
    server
        .mock(
            "DELETE",
            format!("/20160918/vcns/{}", common::VCN_ID).as_str(),
        )
        .with_status(204)
        .create_async()
        .await;

    let config = ConfigBuilder::new()
        .resource(
            "oci_core_virtual_network",
            "t",
            BlockBuilder::new()
                .attr("cidr_block", "10.0.0.0/16")
                .attr("compartment_id", common::COMPARTMENT_ID)
                .attr("display_name", "-tf-vcn"),
        )
        .build();

    let case = TestCase::new()
        .step(TestStep::new(config).import_state(true))
        .prevent_post_destroy_refresh();

    let mut provider = OciProvider::new();
    let err = scenario::run(&mut provider, common::provider_config(&server.url()), case)
        .await
        .unwrap_err();

    match err {
        TfaccError::ImportVerifyMismatch {
            address,
            attribute,
            applied,
            imported,
        } => {
            assert_eq!(address, "oci_core_virtual_network.t");
            assert_eq!(attribute, "display_name");
            assert_eq!(applied, "-tf-vcn");
            assert_eq!(imported, "-tf-vcn-drifted");
        }
        other => panic!("expected ImportVerifyMismatch, got {other:?}"),
    }
}

#[tokio::test]
async fn missing_required_attribute_fails_validation_before_any_call() {
    common::init_tracing();
    // No mocks registered: validation must fail before the first request
    let server = mockito::Server::new_async().await;

    let config = ConfigBuilder::new()
        .resource(
            "oci_core_virtual_network",
            "t",
            BlockBuilder::new().attr("compartment_id", common::COMPARTMENT_ID),
        )
        .build();

    let mut provider = OciProvider::new();
    let err = scenario::run(
        &mut provider,
        common::provider_config(&server.url()),
        TestCase::new().step(TestStep::new(config)),
    )
    .await
    .unwrap_err();

    match err {
        TfaccError::ValidationFailed { address, summary } => {
            assert_eq!(address, "oci_core_virtual_network.t");
            assert!(summary.contains("cidr_block"));
        }
        other => panic!("expected ValidationFailed, got {other:?}"),
    }
}
