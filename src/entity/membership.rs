use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "membership")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub membership_id: String,
    pub pelanggan_id: Uuid,
    pub tier_membership: String,
    pub tanggal_daftar: Date,
    pub expired_date: Date,
    pub status_keaktifan: String,
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::pelanggan::Entity",
        from = "Column::PelangganId",
        to = "super::pelanggan::Column::PelangganId"
    )]
    Pelanggan,
}

impl Related<super::pelanggan::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Pelanggan.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
