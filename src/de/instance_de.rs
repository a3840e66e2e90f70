use serde::de::{
    self, DeserializeOwned, DeserializeSeed, EnumAccess, IntoDeserializer, MapAccess, Unexpected,
    VariantAccess, Visitor,
};
use serde::forward_to_deserialize_any;

use crate::instance::Instance;
use crate::variant::Variant;
use crate::{CMPIError, CMPIResult};

/// Deserialize `instance` into `T`.
///
/// Structs are filled field by field from the properties of the same name
/// (compared case-insensitively), maps receive every property. Properties that
/// are absent or null deserialize as `None`. An enum picks the newtype variant
/// named after the instance's class.
pub fn from_instance<T>(instance: &Instance) -> CMPIResult<T>
where
    T: DeserializeOwned,
{
    T::deserialize(instance)
}

impl Instance {
    pub fn into_desr<T>(&self) -> CMPIResult<T>
    where
        T: DeserializeOwned,
    {
        from_instance(self)
    }
}

/// The variant of a class-named enum, holding the instance itself.
struct ClassVariant<'a>(&'a Instance);

fn not_newtype(unexp: Unexpected<'_>) -> CMPIError {
    de::Error::invalid_type(unexp, &"newtype variant")
}

impl<'de, 'a> EnumAccess<'de> for ClassVariant<'a> {
    type Error = CMPIError;
    type Variant = Self;

    fn variant_seed<V>(self, seed: V) -> Result<(V::Value, Self), CMPIError>
    where
        V: DeserializeSeed<'de>,
    {
        seed.deserialize(self.0.class_name().into_deserializer())
            .map(|class| (class, self))
    }
}

impl<'de, 'a> VariantAccess<'de> for ClassVariant<'a> {
    type Error = CMPIError;

    fn newtype_variant_seed<T>(self, seed: T) -> Result<T::Value, CMPIError>
    where
        T: DeserializeSeed<'de>,
    {
        seed.deserialize(self.0)
    }

    fn unit_variant(self) -> Result<(), CMPIError> {
        Err(not_newtype(Unexpected::UnitVariant))
    }

    fn tuple_variant<V>(self, _len: usize, _visitor: V) -> Result<V::Value, CMPIError>
    where
        V: Visitor<'de>,
    {
        Err(not_newtype(Unexpected::TupleVariant))
    }

    fn struct_variant<V>(self, _fields: &'static [&'static str], _visitor: V) -> Result<V::Value, CMPIError>
    where
        V: Visitor<'de>,
    {
        Err(not_newtype(Unexpected::StructVariant))
    }
}

/// Walks `names`, looking each one up as a property of `instance`.
struct Properties<'a, I> {
    names: I,
    instance: &'a Instance,
    value: Option<Variant>,
}

impl<'de, 'a, I, S> MapAccess<'de> for Properties<'a, I>
where
    I: Iterator<Item = S>,
    S: AsRef<str>,
{
    type Error = CMPIError;

    fn next_key_seed<K>(&mut self, seed: K) -> Result<Option<K::Value>, CMPIError>
    where
        K: DeserializeSeed<'de>,
    {
        let name = match self.names.next() {
            Some(name) => name,
            None => return Ok(None),
        };

        self.value = self.instance.get_property(name.as_ref()).cloned();
        seed.deserialize(name.as_ref().into_deserializer()).map(Some)
    }

    fn next_value_seed<V>(&mut self, seed: V) -> Result<V::Value, CMPIError>
    where
        V: DeserializeSeed<'de>,
    {
        seed.deserialize(self.value.take().unwrap_or(Variant::Null))
    }
}

impl<'de, 'a> de::Deserializer<'de> for &'a Instance {
    type Error = CMPIError;

    fn deserialize_any<V>(self, _visitor: V) -> Result<V::Value, CMPIError>
    where
        V: Visitor<'de>,
    {
        Err(CMPIError::SerdeError(
            "Only structs, maps and enums can be deserialized from instances".into(),
        ))
    }

    fn deserialize_enum<V>(
        self,
        _name: &'static str,
        _variants: &'static [&'static str],
        visitor: V,
    ) -> Result<V::Value, CMPIError>
    where
        V: Visitor<'de>,
    {
        visitor.visit_enum(ClassVariant(self))
    }

    fn deserialize_newtype_struct<V>(self, _name: &'static str, visitor: V) -> Result<V::Value, CMPIError>
    where
        V: Visitor<'de>,
    {
        visitor.visit_newtype_struct(self)
    }

    fn deserialize_map<V>(self, visitor: V) -> Result<V::Value, CMPIError>
    where
        V: Visitor<'de>,
    {
        visitor.visit_map(Properties {
            names: self.properties().map(|(name, _)| name),
            instance: self,
            value: None,
        })
    }

    fn deserialize_struct<V>(
        self,
        _name: &'static str,
        fields: &'static [&'static str],
        visitor: V,
    ) -> Result<V::Value, CMPIError>
    where
        V: Visitor<'de>,
    {
        visitor.visit_map(Properties {
            names: fields.iter(),
            instance: self,
            value: None,
        })
    }

    forward_to_deserialize_any! {
        bool i8 i16 i32 i64 u8 u16 u32 u64 f32 f64 char str string bytes
        byte_buf option unit unit_struct seq tuple
        tuple_struct identifier ignored_any
    }
}

#[allow(non_snake_case)]
#[allow(non_camel_case_types)]
#[cfg(test)]
mod tests {
    use super::*;
    use crate::datetime::CIMDateTime;
    use crate::object_path::ObjectPath;
    use serde::Deserialize;
    use std::collections::HashMap;

    fn domain() -> Instance {
        let op = ObjectPath::new("root/virt", "Xen_ComputerSystem")
            .with_key("CreationClassName", "Xen_ComputerSystem")
            .with_key("Name", "dom1");

        let mut inst = Instance::new(&op);
        inst.set_property("EnabledState", 2u16);
        inst.set_property("Dedicated", vec![2u16, 3u16]);
        inst.set_property(
            "InstallDate",
            "20190113200517.500000-180".parse::<CIMDateTime>().unwrap(),
        );
        inst.set_property("Description", Variant::Null);
        inst
    }

    #[derive(Deserialize, Debug, PartialEq)]
    struct Xen_ComputerSystem {
        Name: String,
        EnabledState: u16,
        Dedicated: Vec<u16>,
        InstallDate: CIMDateTime,
        Description: Option<String>,
        Caption: Option<String>,
    }

    #[test]
    fn it_desr_into_struct() {
        let system: Xen_ComputerSystem = from_instance(&domain()).unwrap();

        assert_eq!(system.Name, "dom1");
        assert_eq!(system.EnabledState, 2);
        assert_eq!(system.Dedicated, vec![2, 3]);
        assert_eq!(system.InstallDate.to_string(), "20190113200517.500000-180");
        assert_eq!(system.Description, None);
        assert_eq!(system.Caption, None);
    }

    #[test]
    fn it_desr_with_renamed_fields() {
        #[derive(Deserialize, Debug)]
        #[serde(rename_all = "PascalCase")]
        struct ComputerSystem {
            name: String,
            enabled_state: u32,
        }

        let system: ComputerSystem = domain().into_desr().unwrap();

        assert_eq!(system.name, "dom1");
        assert_eq!(system.enabled_state, 2);
    }

    #[test]
    fn it_desr_into_map() {
        let map: HashMap<String, Variant> = from_instance(&domain()).unwrap();

        assert_eq!(map.get("Name"), Some(&Variant::String("dom1".into())));
        assert_eq!(map.get("EnabledState"), Some(&Variant::UI2(2)));
        assert_eq!(map.get("Description"), Some(&Variant::Null));
        assert_eq!(map.len(), 6);
    }

    #[test]
    fn it_desr_newtype_and_enum() {
        #[derive(Deserialize, Debug)]
        struct Wrapper(Xen_ComputerSystem);

        #[derive(Deserialize, Debug)]
        struct KVM_ComputerSystem {
            Name: String,
        }

        #[derive(Deserialize, Debug)]
        enum System {
            Xen_ComputerSystem(Xen_ComputerSystem),
            KVM_ComputerSystem(KVM_ComputerSystem),
        }

        let Wrapper(system) = from_instance::<Wrapper>(&domain()).unwrap();
        assert_eq!(system.Name, "dom1");

        match from_instance::<System>(&domain()).unwrap() {
            System::Xen_ComputerSystem(system) => assert_eq!(system.EnabledState, 2),
            other => panic!("Unexpected {:?}", other),
        }
    }

    #[test]
    fn it_rejects_enum_variants_without_a_payload() {
        #[derive(Deserialize, Debug)]
        enum Kind {
            Xen_ComputerSystem,
        }

        #[derive(Deserialize, Debug)]
        enum Other {
            KVM_ComputerSystem(String),
        }

        let err = from_instance::<Kind>(&domain()).unwrap_err();
        assert!(err.to_string().contains("newtype variant"));

        assert!(from_instance::<Other>(&domain()).is_err());
        assert!(from_instance::<u32>(&domain()).is_err());
    }

    #[test]
    fn it_desr_embedded_instances() {
        #[derive(Deserialize, Debug)]
        struct Settings {
            InstanceID: String,
        }

        #[derive(Deserialize, Debug)]
        struct Request {
            Settings: Settings,
        }

        let mut settings = Instance::new(&ObjectPath::new("root/virt", "Xen_VirtualSystemSettingData"));
        settings.set_property("InstanceID", "Xen:dom1");

        let mut request = Instance::new(&ObjectPath::new("root/virt", "Request"));
        request.set_property("Settings", settings);

        let request: Request = request.into_desr().unwrap();

        assert_eq!(request.Settings.InstanceID, "Xen:dom1");
    }

    #[test]
    fn it_fails_on_missing_required_fields() {
        #[derive(Deserialize, Debug)]
        struct Strict {
            Missing: String,
        }

        let err = from_instance::<Strict>(&domain()).unwrap_err();

        assert!(matches!(err, CMPIError::SerdeError(_)));
    }
}
