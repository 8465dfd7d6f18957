use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "booking")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub booking_id: String,
    pub pelanggan_id: Uuid,
    pub tanggal_booking: Date,
    pub jam_mulai: Time,
    pub jam_selesai: Time,
    pub status: String,
    pub total_biaya: i64,
    pub metode_pembayaran: Option<String>,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
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
