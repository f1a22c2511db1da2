//! Catalog types to and from the wire.

use rocket_core::convert::{parse_uuid, timestamp};
use rocket_core::{ErrorCode, ServiceError};
use rocket_proto::v1;

use crate::filter::PartsFilter;
use crate::model::{Category, MetadataValue, Part};

pub const fn category_to_proto(category: Category) -> v1::Category {
    match category {
        Category::Unknown => v1::Category::Unknown,
        Category::Engine => v1::Category::Engine,
        Category::Fuel => v1::Category::Fuel,
        Category::Porthole => v1::Category::Porthole,
        Category::Wing => v1::Category::Wing,
    }
}

pub fn category_from_proto(value: i32) -> Result<Category, ServiceError> {
    match v1::Category::try_from(value) {
        Ok(v1::Category::Unknown) => Ok(Category::Unknown),
        Ok(v1::Category::Engine) => Ok(Category::Engine),
        Ok(v1::Category::Fuel) => Ok(Category::Fuel),
        Ok(v1::Category::Porthole) => Ok(Category::Porthole),
        Ok(v1::Category::Wing) => Ok(Category::Wing),
        Err(_) => Err(ServiceError::new(
            ErrorCode::InvalidArgument,
            format!("unknown category {value}"),
        )),
    }
}

fn metadata_to_proto(value: &MetadataValue) -> v1::MetadataValue {
    use v1::metadata_value::Kind;
    let kind = match value {
        MetadataValue::String(s) => Kind::StringValue(s.clone()),
        MetadataValue::Int64(i) => Kind::Int64Value(*i),
        MetadataValue::Float64(f) => Kind::DoubleValue(*f),
        MetadataValue::Bool(b) => Kind::BoolValue(*b),
    };
    v1::MetadataValue { kind: Some(kind) }
}

pub fn part_to_proto(part: &Part) -> v1::Part {
    v1::Part {
        part_uuid: part.part_uuid.to_string(),
        name: part.name.clone(),
        description: part.description.clone(),
        price: part.price,
        stock_quantity: part.stock_quantity,
        category: category_to_proto(part.category).into(),
        dimensions: Some(v1::Dimensions {
            length: part.dimensions.length,
            width: part.dimensions.width,
            height: part.dimensions.height,
            weight: part.dimensions.weight,
        }),
        manufacturer: Some(v1::Manufacturer {
            name: part.manufacturer.name.clone(),
            country: part.manufacturer.country.clone(),
            website: part.manufacturer.website.clone(),
        }),
        tags: part.tags.clone(),
        metadata: part
            .metadata
            .iter()
            .map(|(k, v)| (k.clone(), metadata_to_proto(v)))
            .collect(),
        created_at: Some(timestamp(part.created_at)),
        updated_at: Some(timestamp(part.updated_at)),
    }
}

/// Convert a request filter. Malformed part ids and unknown categories
/// are rejected here so the repository only ever sees well-formed values.
pub fn filter_from_proto(filter: v1::PartsFilter) -> Result<PartsFilter, ServiceError> {
    Ok(PartsFilter {
        part_uuids: filter
            .part_uuids
            .iter()
            .map(|id| parse_uuid(id, "part_uuids"))
            .collect::<Result<_, _>>()?,
        names: filter.names.into_iter().collect(),
        categories: filter
            .categories
            .into_iter()
            .map(category_from_proto)
            .collect::<Result<_, _>>()?,
        manufacturer_countries: filter.manufacturer_countries.into_iter().collect(),
        manufacturer_names: filter.manufacturer_names.into_iter().collect(),
        tags: filter.tags.into_iter().collect(),
    })
}
