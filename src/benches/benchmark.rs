#![allow(non_snake_case)]

use cmpiutil::std_association::{StdAssoc, StdAssociationMI};
use cmpiutil::{from_instance, parse_embedded_instance, Context, Instance, ObjectPath, SimpleBroker, VecResult};
use criterion::{criterion_group, criterion_main, Criterion};
use serde::Deserialize;
use std::collections::HashMap;

const SETTINGS: &str = r#"<INSTANCE CLASSNAME="Xen_MemResourceAllocationSettingData">
    <PROPERTY NAME="InstanceID" TYPE="string"><VALUE>dom1/mem</VALUE></PROPERTY>
    <PROPERTY NAME="ResourceType" TYPE="uint16"><VALUE>4</VALUE></PROPERTY>
    <PROPERTY NAME="VirtualQuantity" TYPE="uint64"><VALUE>1048576</VALUE></PROPERTY>
    <PROPERTY NAME="Limit" TYPE="uint64"><VALUE>2097152</VALUE></PROPERTY>
    <PROPERTY NAME="AutomaticAllocation" TYPE="boolean"><VALUE>TRUE</VALUE></PROPERTY>
    <PROPERTY.ARRAY NAME="Connection" TYPE="string">
        <VALUE.ARRAY><VALUE>xenbr0</VALUE><VALUE>xenbr1</VALUE></VALUE.ARRAY>
    </PROPERTY.ARRAY>
</INSTANCE>"#;

#[derive(Deserialize, Debug)]
pub struct Xen_MemResourceAllocationSettingData {
    pub InstanceID: String,
    pub ResourceType: u16,
    pub VirtualQuantity: u64,
    pub Limit: u64,
    pub AutomaticAllocation: bool,
    pub Connection: Vec<String>,
}

fn parse_settings(broker: &SimpleBroker) -> Instance {
    parse_embedded_instance(SETTINGS, broker, "root/virt").unwrap().unwrap()
}

fn provider(broker: &SimpleBroker) -> StdAssociationMI<&SimpleBroker> {
    let assoc = StdAssoc::new(|reference, _info, list| {
        for i in 0..32 {
            let op = ObjectPath::new(reference.namespace(), "Xen_Processor")
                .with_key("SystemName", "dom1")
                .with_key("DeviceID", format!("dom1/{}", i));
            list.add(Instance::new(&op))?;
        }
        Ok(())
    })
    .source_class(&["CIM_ComputerSystem"])
    .source_prop("GroupComponent")
    .target_class(&["CIM_Processor"])
    .target_prop("PartComponent")
    .assoc_class(&["Xen_SystemDevice", "Xen_ComputerSystemDevice"]);

    StdAssociationMI::new("Xen_SystemDeviceProvider", broker, vec![assoc])
}

fn criterion_benchmark(c: &mut Criterion) {
    let broker = SimpleBroker::new()
        .with_class("Xen_ComputerSystem", "CIM_ComputerSystem")
        .with_class("Xen_Processor", "CIM_Processor");

    c.bench_function("parse embedded instance", |b| b.iter(|| parse_settings(&broker)));

    c.bench_function("parse and deserialize embedded instance", |b| {
        b.iter(|| {
            let _settings: Xen_MemResourceAllocationSettingData =
                from_instance(&parse_settings(&broker)).unwrap();
        })
    });

    c.bench_function("parse embedded instance into hashmap", |b| {
        b.iter(|| {
            let _settings: HashMap<String, cmpiutil::Variant> =
                from_instance(&parse_settings(&broker)).unwrap();
        })
    });

    let mi = provider(&broker);
    let reference = ObjectPath::new("root/virt", "Xen_ComputerSystem").with_key("Name", "dom1");
    let context = Context::new();

    c.bench_function("associators", |b| {
        b.iter(|| {
            let mut results = VecResult::new();
            mi.associators(&context, &mut results, &reference, None, Some("CIM_Processor"), None, None, None)
                .unwrap()
        })
    });

    c.bench_function("reference names", |b| {
        b.iter(|| {
            let mut results = VecResult::new();
            mi.reference_names(&context, &mut results, &reference, None, None)
                .unwrap()
        })
    });
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);
