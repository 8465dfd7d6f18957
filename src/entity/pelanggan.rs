use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "pelanggan")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub pelanggan_id: Uuid,
    #[sea_orm(unique)]
    pub username: String,
    pub nama: String,
    pub email: Option<String>,
    pub no_telepon: Option<String>,
    /// Empty for customers imported from the CRM until they set a password.
    pub password_hash: Option<String>,
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::booking::Entity")]
    Booking,
    #[sea_orm(has_many = "super::membership::Entity")]
    Membership,
}

impl Related<super::booking::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Booking.def()
    }
}

impl Related<super::membership::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Membership.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
